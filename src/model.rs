//! Narrow structural model of a page class.
//!
//! A [`SourceUnit`] holds exactly what the generator ever writes: a package
//! clause, a public class header and a flat list of annotated private fields.
//! Anything richer is rejected by the parser instead of being modelled here.
//! Fields are private so every unit that exists renders to source the parser
//! reads back unchanged.

use indexmap::IndexMap;

use crate::error::{Result, ScaffoldError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    pub fn keyword(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    qualified_name: String,
    arguments: IndexMap<String, String>,
}

impl Annotation {
    pub fn new(qualified_name: impl Into<String>) -> Result<Self> {
        let qualified_name = qualified_name.into();
        validate_type_name(&qualified_name)?;
        Ok(Self {
            qualified_name,
            arguments: IndexMap::new(),
        })
    }

    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    pub fn arguments(&self) -> &IndexMap<String, String> {
        &self.arguments
    }

    pub fn is_marker(&self) -> bool {
        self.arguments.is_empty()
    }

    pub fn set_argument(&mut self, key: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let key = key.into();
        validate_identifier(&key)?;
        if self.arguments.contains_key(&key) {
            return Err(ScaffoldError::ArgumentConflict {
                key,
                annotation: self.qualified_name.clone(),
            });
        }
        self.arguments.insert(key, value.into());
        Ok(())
    }

    pub fn argument(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    name: String,
    ty: String,
    annotations: Vec<Annotation>,
}

impl Field {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &str {
        &self.ty
    }

    /// Fields are always private.
    pub fn visibility(&self) -> Visibility {
        Visibility::Private
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Appends an annotation; the same annotation type may appear more than once.
    pub fn add_annotation(&mut self, qualified_name: impl Into<String>) -> Result<&mut Annotation> {
        Ok(self.push_annotation(Annotation::new(qualified_name)?))
    }

    pub fn push_annotation(&mut self, annotation: Annotation) -> &mut Annotation {
        self.annotations.push(annotation);
        let last = self.annotations.len() - 1;
        &mut self.annotations[last]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    package_name: String,
    name: String,
    fields: Vec<Field>,
}

impl SourceUnit {
    /// Builds an empty public class. No suffix handling happens here.
    pub fn new_class(package_name: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        let package_name = package_name.into();
        let name = name.into();
        validate_package(&package_name)?;
        validate_type_name(&name)?;
        Ok(Self {
            package_name,
            name,
            fields: Vec::new(),
        })
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Classes are always public.
    pub fn visibility(&self) -> Visibility {
        Visibility::Public
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn qualified_name(&self) -> String {
        if self.package_name.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.package_name, self.name)
        }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Appends a field. Only private fields of a named reference type are accepted.
    pub fn add_field(
        &mut self,
        name: impl Into<String>,
        ty: impl Into<String>,
        visibility: Visibility,
    ) -> Result<&mut Field> {
        let name = name.into();
        let ty = ty.into();
        if visibility != Visibility::Private {
            return Err(ScaffoldError::UnsupportedConstruct {
                what: format!("'{}' field modifier", visibility.keyword()),
            });
        }
        validate_identifier(&name)?;
        validate_type_name(&ty)?;
        if self.field(&name).is_some() {
            return Err(ScaffoldError::NameConflict {
                name,
                class: self.qualified_name(),
            });
        }

        self.fields.push(Field {
            name,
            ty,
            annotations: Vec::new(),
        });
        let last = self.fields.len() - 1;
        Ok(&mut self.fields[last])
    }
}

const RESERVED_WORDS: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "final", "finally", "float",
    "for", "goto", "if", "implements", "import", "instanceof", "int", "interface", "long",
    "native", "new", "package", "private", "protected", "public", "return", "short", "static",
    "strictfp", "super", "switch", "synchronized", "this", "throw", "throws", "transient", "try",
    "void", "volatile", "while", "_", "true", "false", "null",
];

pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(unicode_ident::is_xid_start(first) || first == '_' || first == '$') {
        return false;
    }
    chars.all(|c| unicode_ident::is_xid_continue(c) || c == '$') && !RESERVED_WORDS.contains(&s)
}

// Identifiers that cannot name a type.
const RESTRICTED_TYPE_NAMES: &[&str] = &["permits", "record", "sealed", "var", "yield"];

/// Dotted identifiers such as `org.openqa.selenium.WebElement`; never empty.
pub fn is_qualified_name(s: &str) -> bool {
    s.split('.').all(is_identifier)
}

pub fn is_type_name(s: &str) -> bool {
    is_qualified_name(s)
        && s.rsplit('.')
            .next()
            .is_some_and(|simple| !RESTRICTED_TYPE_NAMES.contains(&simple))
}

pub fn validate_identifier(name: &str) -> Result<()> {
    if is_identifier(name) {
        Ok(())
    } else {
        Err(ScaffoldError::InvalidIdentifier {
            name: name.to_string(),
        })
    }
}

pub fn validate_type_name(name: &str) -> Result<()> {
    if is_type_name(name) {
        Ok(())
    } else {
        Err(ScaffoldError::InvalidIdentifier {
            name: name.to_string(),
        })
    }
}

/// The empty package is valid and means the unnamed package.
pub fn validate_package(package_name: &str) -> Result<()> {
    if package_name.is_empty() {
        Ok(())
    } else {
        if is_qualified_name(package_name) {
            Ok(())
        } else {
            Err(ScaffoldError::InvalidIdentifier {
                name: package_name.to_string(),
            })
        }
    }
}
