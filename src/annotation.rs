use crate::error::{Result, ScaffoldError};
use crate::model::{Annotation, is_identifier};

/// Splits a `key=value` locator on the first `=`. The value is kept verbatim,
/// so `xpath=//a[@id='x']` keeps every later `=`.
pub fn parse_locator(spec: &str) -> Result<(String, String)> {
    let malformed = |reason: &str| ScaffoldError::MalformedArgument {
        spec: spec.to_string(),
        reason: reason.to_string(),
    };

    let (key, value) = spec
        .split_once('=')
        .ok_or_else(|| malformed("expected key=value"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(malformed("locator strategy is empty"));
    }
    if !is_identifier(key) {
        return Err(malformed("locator strategy is not an identifier"));
    }
    if value.is_empty() {
        return Err(malformed("locator value is empty"));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Builds a keyed annotation carrying exactly one locator argument.
pub fn find_by(qualified_name: &str, spec: &str) -> Result<Annotation> {
    let (key, value) = parse_locator(spec)?;
    let mut annotation = Annotation::new(qualified_name)?;
    annotation.set_argument(key, value)?;
    Ok(annotation)
}

pub fn marker(qualified_name: &str) -> Result<Annotation> {
    Annotation::new(qualified_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIND_BY: &str = "org.openqa.selenium.support.FindBy";

    #[test]
    fn find_by_builds_single_argument() {
        let css = find_by(FIND_BY, "css=.btn").unwrap();
        assert_eq!(css.qualified_name(), FIND_BY);
        assert_eq!(css.arguments().len(), 1);
        assert_eq!(css.argument("css"), Some(".btn"));

        let id = find_by(FIND_BY, "id=submit").unwrap();
        assert_eq!(id.argument("id"), Some("submit"));
    }

    #[test]
    fn value_keeps_later_separators() {
        let (key, value) = parse_locator("xpath=//input[@name='q' and @type='text']=x").unwrap();
        assert_eq!(key, "xpath");
        assert_eq!(value, "//input[@name='q' and @type='text']=x");
    }

    #[test]
    fn rejects_missing_separator() {
        let err = find_by(FIND_BY, "noseparator").unwrap_err();
        assert!(matches!(err, ScaffoldError::MalformedArgument { ref spec, .. } if spec == "noseparator"));
    }

    #[test]
    fn rejects_empty_parts() {
        assert!(parse_locator("=submit").is_err());
        assert!(parse_locator("id=").is_err());
        assert!(parse_locator("not valid=x").is_err());
    }

    #[test]
    fn marker_has_no_arguments() {
        let root = marker("org.jboss.arquillian.graphene.spi.annotations.Root").unwrap();
        assert!(root.is_marker());
        assert!(marker("not an.annotation").is_err());
    }
}
