mod properties;
mod yaml;

use std::collections::BTreeMap;

use crate::common::Result;

/// Flat mapping of dotted property names to values parsed from one file.
pub type Properties = BTreeMap<String, String>;

/// File format, chosen from the file name only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Properties,
    Yaml,
}

impl Format {
    pub(crate) fn parse(self, content: &[u8]) -> Result<Properties> {
        match self {
            Format::Properties => properties::parse(&properties::decode(content)),
            Format::Yaml => {
                let content = std::str::from_utf8(content).map_err(|err| {
                    std::io::Error::new(std::io::ErrorKind::InvalidData, err)
                })?;
                yaml::parse(content)
            }
        }
    }
}

/// Decides which files are imported and how they are parsed.
///
/// Matching is a case-insensitive substring match on the file name, so
/// `app.properties.bak` is accepted when `.properties` is.
#[derive(Debug, Clone)]
pub struct ExtensionFilter {
    acceptable: Vec<String>,
    yaml: Vec<String>,
}

impl ExtensionFilter {
    pub fn new<I1, I2>(acceptable: I1, yaml: I2) -> Self
    where
        I1: IntoIterator,
        I1::Item: AsRef<str>,
        I2: IntoIterator,
        I2::Item: AsRef<str>,
    {
        fn normalize<I>(extensions: I) -> Vec<String>
        where
            I: IntoIterator,
            I::Item: AsRef<str>,
        {
            extensions
                .into_iter()
                .map(|ext| ext.as_ref().to_lowercase())
                .filter(|ext| !ext.is_empty())
                .collect()
        }

        Self {
            acceptable: normalize(acceptable),
            yaml: normalize(yaml),
        }
    }

    /// Format to parse `file_name` with, `None` when the file is not imported.
    pub fn select(&self, file_name: &str) -> Option<Format> {
        let name = file_name.to_lowercase();

        if !self.acceptable.iter().any(|ext| name.contains(ext.as_str())) {
            return None;
        }
        if self.yaml.iter().any(|ext| name.contains(ext.as_str())) {
            Some(Format::Yaml)
        } else {
            Some(Format::Properties)
        }
    }
}
