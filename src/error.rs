//! Custom error types for apidiff.

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to read file {path}: {source}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid XML in {path}: {source}")]
    XmlError {
        path: String,
        #[source]
        source: roxmltree::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    JsonError {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid YAML in {path}: {source}")]
    YamlError {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid TOML in {path}: {source}")]
    TomlError {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Missing <{element}> element in {context}")]
    MissingElement { element: String, context: String },

    #[error("Missing '{attribute}' attribute on <{element}> in {context}")]
    MissingAttribute {
        element: String,
        attribute: String,
        context: String,
    },

    #[error("Invalid value '{value}' for '{attribute}' in {context}")]
    InvalidValue {
        attribute: String,
        value: String,
        context: String,
    },

    #[error("Could not detect document format for {path}")]
    UnknownFormat { path: String },
}

#[derive(Debug, thiserror::Error)]
pub enum CompareError {
    #[error("Failed to build class hierarchy: type {name} is declared more than once")]
    DuplicateType { name: String },
}

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("Unknown output format: {format}")]
    UnknownFormat { format: String },

    #[error("Unbalanced report events: {message}")]
    UnbalancedEvents { message: String },
}

#[derive(Debug, thiserror::Error)]
pub enum ApiDiffError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("Comparison failed in {location}: {source}")]
    Compare {
        location: String,
        #[source]
        source: CompareError,
    },

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error("Invalid configuration: {message}")]
    ConfigError { message: String },
}

impl LoadError {
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    pub fn read_error(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::ReadError {
            path: path.into(),
            source,
        }
    }

    pub fn xml_error(path: impl Into<String>, source: roxmltree::Error) -> Self {
        Self::XmlError {
            path: path.into(),
            source,
        }
    }

    pub fn json_error(path: impl Into<String>, source: serde_json::Error) -> Self {
        Self::JsonError {
            path: path.into(),
            source,
        }
    }

    pub fn yaml_error(path: impl Into<String>, source: serde_yaml::Error) -> Self {
        Self::YamlError {
            path: path.into(),
            source,
        }
    }

    pub fn toml_error(path: impl Into<String>, source: toml::de::Error) -> Self {
        Self::TomlError {
            path: path.into(),
            source,
        }
    }

    pub fn missing_element(element: impl Into<String>, context: impl Into<String>) -> Self {
        Self::MissingElement {
            element: element.into(),
            context: context.into(),
        }
    }

    pub fn missing_attribute(
        element: impl Into<String>,
        attribute: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self::MissingAttribute {
            element: element.into(),
            attribute: attribute.into(),
            context: context.into(),
        }
    }

    pub fn unknown_format(path: impl Into<String>) -> Self {
        Self::UnknownFormat { path: path.into() }
    }
}

impl ApiDiffError {
    pub fn compare(location: impl Into<String>, source: CompareError) -> Self {
        Self::Compare {
            location: location.into(),
            source,
        }
    }
}
