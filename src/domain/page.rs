use serde::{Deserialize, Serialize};

/// Vistas de la interfaz; solo una está activa a la vez.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    #[default]
    Scanner,
    Directory,
}

impl Page {
    pub const ALL: [Page; 2] = [Page::Scanner, Page::Directory];

    pub fn title(&self) -> &'static str {
        match self {
            Page::Scanner => "Lesion Scanner",
            Page::Directory => "Local Directory",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&Page::Directory).unwrap(), "\"directory\"");
        assert_eq!(Page::default(), Page::Scanner);
    }
}
