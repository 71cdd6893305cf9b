use std::fmt;

/// Errors raised while resolving a type name to its declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// No search root contains the package
    PackageNotFound { package: String },
    /// The package directory exists but could not be read
    LoadFailed { package: String, message: String },
    /// The package was found but does not declare the type
    TypeNotFound { name: String, package: String },
    /// A qualifier is neither a package path nor an imported alias
    NotImported { alias: String, package: String },
    /// A chain of type aliases refers back to itself
    AliasCycle { id: String },
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ResolveError::PackageNotFound { package } => {
                write!(f, "can not find package {}", package)
            }
            ResolveError::LoadFailed { package, message } => {
                write!(f, "can not load package {}: {}", package, message)
            }
            ResolveError::TypeNotFound { name, package } => {
                write!(f, "can not find definition of {} in package {}", name, package)
            }
            ResolveError::NotImported { alias, package } => {
                write!(f, "package {} is not imported to {}", alias, package)
            }
            ResolveError::AliasCycle { id } => write!(f, "type alias {} refers to itself", id),
        }
    }
}

impl std::error::Error for ResolveError {}

/// A comment line that does not match the grammar of its tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationError {
    /// The tag as written, e.g. `@Router`
    pub tag: String,
    /// The full comment line
    pub line: String,
    /// What was wrong with it
    pub reason: String,
}

impl AnnotationError {
    pub fn new(tag: &str, line: &str, reason: impl Into<String>) -> Self {
        Self {
            tag: tag.to_string(),
            line: line.to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for AnnotationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "can not parse {} comment \"{}\": {}", self.tag, self.line, self.reason)
    }
}

impl std::error::Error for AnnotationError {}

/// Category of a recorded diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A comment line did not match its grammar; the line was skipped
    Grammar,
    /// A package or type could not be resolved
    Resolution,
}

/// A non-fatal problem found during a run, attached to where it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Package id being processed
    pub package: String,
    /// Declaration (function or type) the problem belongs to, if any
    pub declaration: Option<String>,
    /// 1-based comment line within the declaration's doc block
    pub line: Option<usize>,
    pub message: String,
}

impl Diagnostic {
    pub fn grammar(package: &str, declaration: &str, line: usize, err: &AnnotationError) -> Self {
        Self {
            kind: DiagnosticKind::Grammar,
            package: package.to_string(),
            declaration: Some(declaration.to_string()),
            line: Some(line),
            message: err.to_string(),
        }
    }

    pub fn resolution(package: &str, declaration: Option<&str>, err: &ResolveError) -> Self {
        Self {
            kind: DiagnosticKind::Resolution,
            package: package.to_string(),
            declaration: declaration.map(str::to_string),
            line: None,
            message: err.to_string(),
        }
    }

    /// Attach a comment line number
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.package)?;
        if let Some(declaration) = &self.declaration {
            write!(f, "::{}", declaration)?;
        }
        if let Some(line) = self.line {
            write!(f, " (doc line {})", line)?;
        }
        write!(f, ": {}", self.message)
    }
}
