use std::path::PathBuf;

use tracing::{debug, info};

use crate::annotation;
use crate::error::{Result, ScaffoldError};
use crate::model::{SourceUnit, Visibility};
use crate::package::{self, Resolution};
use crate::persist;
use crate::workspace::{Resource, Workspace};

pub const PAGE_SUFFIX: &str = "Page";
pub const ROOT_FIELD: &str = "root";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedPage {
    pub qualified_name: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedElement {
    pub class_name: String,
    pub field_name: String,
    pub path: PathBuf,
}

/// Appends `Page` unless the name already ends with it.
pub fn normalize_page_name(name: &str) -> String {
    if name.ends_with(PAGE_SUFFIX) {
        name.to_string()
    } else {
        format!("{name}{PAGE_SUFFIX}")
    }
}

pub fn create_page(
    ws: &mut Workspace,
    name_input: &str,
    package_input: Option<&str>,
) -> Result<CreatedPage> {
    let name = normalize_page_name(name_input.trim());
    let namespace = resolve_page_package(ws, package_input)?;
    debug!(%namespace, %name, "resolved page class");

    let mut unit = SourceUnit::new_class(namespace, name)?;
    let root_marker = annotation::marker(&ws.profile.root_annotation)?;
    unit.add_field(ROOT_FIELD, ws.profile.element_type.as_str(), Visibility::Private)?
        .push_annotation(root_marker);

    let path = persist::location(&ws.output_root, &unit);
    if path.exists() {
        return Err(ScaffoldError::PageExists { path });
    }
    persist::write_to(&path, &unit)?;

    let qualified_name = unit.qualified_name();
    info!(class = %qualified_name, path = %path.display(), "created page");
    Ok(CreatedPage {
        qualified_name,
        path,
    })
}

fn resolve_page_package(ws: &mut Workspace, package_input: Option<&str>) -> Result<String> {
    match package::resolve(package_input, &ws.current_dir, &ws.source_roots) {
        Resolution::Namespace(ns) => Ok(ns),
        Resolution::NeedsPrompt => {
            let default = ws.default_page_package();
            let answer = ws.ask_package(
                "In which package would you like to create this page? Press enter for the default",
                &default,
            )?;
            let answer = answer.trim();
            if answer.is_empty() {
                return Err(ScaffoldError::PackageResolution {
                    message: format!(
                        "{} is not under a source root and no package was given",
                        ws.current_dir.display()
                    ),
                });
            }
            Ok(answer.to_string())
        }
    }
}

pub fn add_element(ws: &mut Workspace, name_input: &str, locator: &str) -> Result<CreatedElement> {
    let path = match ws.active_resource()? {
        Resource::JavaSource(path) => path,
        other => {
            return Err(ScaffoldError::ResourceTypeMismatch {
                path: other.path().to_path_buf(),
            });
        }
    };

    let mut unit = persist::read(&path)?;
    let find_by = annotation::find_by(&ws.profile.find_by_annotation, locator)?;
    let field_name = name_input.trim();
    unit.add_field(field_name, ws.profile.element_type.as_str(), Visibility::Private)?
        .push_annotation(find_by);
    persist::write_to(&path, &unit)?;

    info!(class = %unit.qualified_name(), field = field_name, "added element");
    Ok(CreatedElement {
        class_name: unit.qualified_name(),
        field_name: field_name.to_string(),
        path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::PackagePrompt;
    use tempfile::TempDir;

    struct Answer(&'static str);

    impl PackagePrompt for Answer {
        fn ask_package(&mut self, _message: &str, default: &str) -> Result<String> {
            Ok(if self.0 == "<default>" {
                default.to_string()
            } else {
                self.0.to_string()
            })
        }
    }

    fn workspace(temp: &TempDir, answer: &'static str) -> Workspace {
        let output_root = temp.path().join("src/test/java");
        Workspace::new(temp.path().to_path_buf(), output_root.clone(), Box::new(Answer(answer)))
            .with_source_roots(vec![temp.path().join("src/main/java"), output_root])
            .with_base_package("com.acme")
    }

    #[test]
    fn normalize_page_name_is_idempotent() {
        assert_eq!(normalize_page_name("Login"), "LoginPage");
        assert_eq!(normalize_page_name("LoginPage"), "LoginPage");
        assert_eq!(normalize_page_name(&normalize_page_name("Cart")), "CartPage");
        assert_eq!(normalize_page_name("Pager"), "PagerPage");
        assert_eq!(normalize_page_name(""), "Page");
    }

    #[test]
    fn create_page_writes_root_field() {
        let temp = TempDir::new().unwrap();
        let mut ws = workspace(&temp, "<default>");

        let created = create_page(&mut ws, "Login", Some("com.app.pages")).unwrap();

        assert_eq!(created.qualified_name, "com.app.pages.LoginPage");
        assert_eq!(
            created.path,
            temp.path().join("src/test/java/com/app/pages/LoginPage.java")
        );
        let unit = persist::read(&created.path).unwrap();
        assert_eq!(unit.fields().len(), 1);
        let root = &unit.fields()[0];
        assert_eq!(root.name(), "root");
        assert_eq!(root.ty(), "org.openqa.selenium.WebElement");
        assert_eq!(root.visibility(), Visibility::Private);
        assert_eq!(root.annotations().len(), 1);
        assert_eq!(
            root.annotations()[0].qualified_name(),
            "org.jboss.arquillian.graphene.spi.annotations.Root"
        );
        assert!(root.annotations()[0].is_marker());
    }

    #[test]
    fn create_page_uses_directory_package() {
        let temp = TempDir::new().unwrap();
        let mut ws = workspace(&temp, "<default>");
        ws.current_dir = temp.path().join("src/test/java/com/shop");

        let created = create_page(&mut ws, "CartPage", None).unwrap();
        assert_eq!(created.qualified_name, "com.shop.CartPage");
    }

    #[test]
    fn create_page_falls_back_to_prompt_default() {
        let temp = TempDir::new().unwrap();
        let mut ws = workspace(&temp, "<default>");

        let created = create_page(&mut ws, "Home", None).unwrap();
        assert_eq!(created.qualified_name, "com.acme.pages.HomePage");
    }

    #[test]
    fn empty_prompt_answer_fails_resolution() {
        let temp = TempDir::new().unwrap();
        let mut ws = workspace(&temp, "");

        let err = create_page(&mut ws, "Home", None).unwrap_err();
        assert!(matches!(err, ScaffoldError::PackageResolution { .. }));
    }

    #[test]
    fn create_page_rejects_padded_explicit_package() {
        let temp = TempDir::new().unwrap();
        let mut ws = workspace(&temp, "<default>");

        let err = create_page(&mut ws, "Login", Some(" com.app ")).unwrap_err();
        assert!(matches!(err, ScaffoldError::InvalidIdentifier { ref name } if name == " com.app "));
        assert!(!temp.path().join("src").exists());
    }

    #[test]
    fn create_page_refuses_to_overwrite() {
        let temp = TempDir::new().unwrap();
        let mut ws = workspace(&temp, "<default>");
        let created = create_page(&mut ws, "Login", Some("a")).unwrap();
        let before = std::fs::read_to_string(&created.path).unwrap();

        let err = create_page(&mut ws, "LoginPage", Some("a")).unwrap_err();
        assert!(matches!(err, ScaffoldError::PageExists { .. }));
        assert_eq!(std::fs::read_to_string(&created.path).unwrap(), before);
    }

    #[test]
    fn add_element_appends_after_root() {
        let temp = TempDir::new().unwrap();
        let mut ws = workspace(&temp, "<default>");
        let created = create_page(&mut ws, "Login", Some("com.app.pages")).unwrap();
        ws.pick_up(created.path.clone());

        let element = add_element(&mut ws, "submitButton", "id=submit").unwrap();
        assert_eq!(element.field_name, "submitButton");
        assert_eq!(element.path, created.path);

        let unit = persist::read(&created.path).unwrap();
        let names: Vec<&str> = unit.fields().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["root", "submitButton"]);
        assert!(unit.fields()[0].annotations()[0].is_marker());
        let find_by = &unit.fields()[1].annotations()[0];
        assert_eq!(find_by.qualified_name(), "org.openqa.selenium.support.FindBy");
        assert_eq!(find_by.argument("id"), Some("submit"));
    }

    #[test]
    fn add_element_conflict_leaves_file_unchanged() {
        let temp = TempDir::new().unwrap();
        let mut ws = workspace(&temp, "<default>");
        let created = create_page(&mut ws, "Login", Some("a")).unwrap();
        ws.pick_up(created.path.clone());
        let before = std::fs::read_to_string(&created.path).unwrap();

        let err = add_element(&mut ws, "root", "css=.root").unwrap_err();
        assert!(matches!(err, ScaffoldError::NameConflict { .. }));
        let err = add_element(&mut ws, "other", "noseparator").unwrap_err();
        assert!(matches!(err, ScaffoldError::MalformedArgument { .. }));
        assert_eq!(std::fs::read_to_string(&created.path).unwrap(), before);
    }

    #[test]
    fn add_element_rejects_non_class_source() {
        let temp = TempDir::new().unwrap();
        let mut ws = workspace(&temp, "<default>");
        let path = temp.path().join("Nav.java");
        let source = "package a;\n\npublic interface Nav {\n}\n";
        std::fs::write(&path, source).unwrap();
        ws.pick_up(path.clone());

        let err = add_element(&mut ws, "link", "id=x").unwrap_err();
        assert!(matches!(err, ScaffoldError::UnsupportedKind { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), source);
    }

    #[test]
    fn add_element_requires_java_resource() {
        let temp = TempDir::new().unwrap();
        let mut ws = workspace(&temp, "<default>");

        let err = add_element(&mut ws, "link", "id=x").unwrap_err();
        assert!(matches!(err, ScaffoldError::NoActiveResource));

        ws.pick_up(temp.path().to_path_buf());
        let err = add_element(&mut ws, "link", "id=x").unwrap_err();
        assert!(matches!(err, ScaffoldError::ResourceTypeMismatch { .. }));
    }
}
