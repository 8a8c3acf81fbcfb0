use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use smol_str::SmolStr;
use thiserror::Error;

const REPORT_ERR: ReportKind = ReportKind::Custom("ATOM", Color::Unset);

/// Coarse classification of every failure a run can end with.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// Malformed source text.
    Parse,
    /// A special form used with the wrong shape.
    Syntax,
    /// A word or `set` target no frame owns.
    Unbound,
    /// Everything else that goes wrong while applying values.
    Type,
}

#[derive(Debug, Error)]
pub enum AtomError {
    #[error("parsing failed: {0}")]
    ParsingError(#[from] ParsingError),

    #[error("interpreting failed: {0}")]
    InterpretingError(#[from] InterpretingError),
}

impl AtomError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ParsingError(_) => ErrorKind::Parse,
            Self::InterpretingError(e) => e.kind(),
        }
    }

    pub fn to_report(&self, source: &str) -> String {
        let report = match self {
            Self::ParsingError(e) => e.to_report(),
            Self::InterpretingError(e) => e.to_report(),
        };

        let mut buf = Vec::new();
        if report.write(Source::from(source), &mut buf).is_err() {
            return self.to_string();
        }

        String::from_utf8_lossy(&buf).into_owned()
    }
}

#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("{message} at {start}..{end}")]
pub struct ParsingError {
    pub start: usize,
    pub end: usize,
    pub message: SmolStr,
}

impl ParsingError {
    fn to_report(&self) -> Report<'_> {
        Report::build(REPORT_ERR, (), self.start)
            .with_message("atom.read.tape_err")
            .with_label(
                Label::new(self.start..self.end).with_message(format!("「{}」", self.message)),
            )
            .with_config(Config::default().with_color(false))
            .finish()
    }
}

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum InterpretingError {
    #[error("{0}")]
    LookupError(LookupError),

    #[error("{0}")]
    FormError(FormError),

    #[error("{0}")]
    FuncError(FuncError),

    #[error("{0}")]
    ArityError(ArityError),

    #[error("{0}")]
    TypeError(TypeError),

    #[error("{0}")]
    IndexError(IndexError),

    #[error("{0}")]
    SealedError(SealedError),

    #[error("{0}")]
    OutputError(OutputError),
}

impl InterpretingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::LookupError(_) => ErrorKind::Unbound,
            Self::FormError(_) => ErrorKind::Syntax,
            Self::FuncError(_)
            | Self::ArityError(_)
            | Self::TypeError(_)
            | Self::IndexError(_)
            | Self::SealedError(_)
            | Self::OutputError(_) => ErrorKind::Type,
        }
    }

    pub fn to_report(&self) -> Report<'_> {
        match self {
            Self::LookupError(e) => e.to_report(),
            Self::FormError(e) => e.to_report(),
            Self::FuncError(e) => e.to_report(),
            Self::ArityError(e) => e.to_report(),
            Self::TypeError(e) => e.to_report(),
            Self::IndexError(e) => e.to_report(),
            Self::SealedError(e) => e.to_report(),
            Self::OutputError(e) => e.to_report(),
        }
    }
}

#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("unbound reference `{name}`")]
pub struct LookupError {
    pub start: usize,
    pub end: usize,
    pub name: SmolStr,
}

impl LookupError {
    fn to_report(&self) -> Report<'_> {
        Report::build(REPORT_ERR, (), self.start)
            .with_message("atom.eval.lookup_err")
            .with_label(
                Label::new(self.start..self.end)
                    .with_message(format!("「no frame binds `{}`」", self.name)),
            )
            .with_config(Config::default().with_color(false))
            .finish()
    }
}

#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("bad use of `{form}`: expected {expected}")]
pub struct FormError {
    pub start: usize,
    pub end: usize,
    pub form: SmolStr,
    pub expected: SmolStr,
}

impl FormError {
    fn to_report(&self) -> Report<'_> {
        Report::build(REPORT_ERR, (), self.start)
            .with_message("atom.eval.form_err")
            .with_label(Label::new(self.start..self.end).with_message(format!(
                "「`{}` expects {}」",
                self.form, self.expected
            )))
            .with_config(Config::default().with_color(false))
            .finish()
    }
}

#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("cannot apply a value of type {func_type}")]
pub struct FuncError {
    pub outer_start: usize,
    pub outer_end: usize,
    pub func_start: usize,
    pub func_end: usize,
    pub func_type: SmolStr,
}

impl FuncError {
    fn to_report(&self) -> Report<'_> {
        Report::build(REPORT_ERR, (), self.outer_start)
            .with_message("atom.eval.proc_err")
            .with_label(
                Label::new(self.outer_start..self.outer_end)
                    .with_message("「can only apply arguments to functions」"),
            )
            .with_label(
                Label::new(self.func_start..self.func_end).with_message(format!(
                    "expected type Func but this is type {}",
                    self.func_type
                )),
            )
            .with_config(Config::default().with_color(false))
            .finish()
    }
}

#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("`{name}` takes {expected} argument(s) but got {found}")]
pub struct ArityError {
    pub start: usize,
    pub end: usize,
    pub name: SmolStr,
    pub expected: usize,
    pub found: usize,
}

impl ArityError {
    fn to_report(&self) -> Report<'_> {
        Report::build(REPORT_ERR, (), self.start)
            .with_message("atom.eval.arity_err")
            .with_label(Label::new(self.start..self.end).with_message(format!(
                "「`{}` takes {} argument(s) but got {}」",
                self.name, self.expected, self.found
            )))
            .with_config(Config::default().with_color(false))
            .finish()
    }
}

#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("expected one of ({}) but got {current_type}", .valid_types.join(", "))]
pub struct TypeError {
    pub arg_start: usize,
    pub arg_end: usize,
    pub func_start: usize,
    pub func_end: usize,
    pub current_type: SmolStr,
    pub valid_types: Vec<SmolStr>,
}

impl TypeError {
    fn to_report(&self) -> Report<'_> {
        Report::build(REPORT_ERR, (), self.func_start)
            .with_message("atom.eval.pat_err")
            .with_label(
                Label::new(self.func_start..self.func_end)
                    .with_message("「argument type is invalid」"),
            )
            .with_label(
                Label::new(self.arg_start..self.arg_end).with_message(format!(
                    "expected one of ({}) but this is type {}",
                    self.valid_types.join(", "),
                    self.current_type,
                )),
            )
            .with_config(Config::default().with_color(false))
            .finish()
    }
}

#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("index {index} is out of range for length {length}")]
pub struct IndexError {
    pub start: usize,
    pub end: usize,
    pub index: SmolStr,
    pub length: usize,
}

impl IndexError {
    fn to_report(&self) -> Report<'_> {
        Report::build(REPORT_ERR, (), self.start)
            .with_message("atom.eval.index_err")
            .with_label(Label::new(self.start..self.end).with_message(format!(
                "「index {} is out of range for length {}」",
                self.index, self.length
            )))
            .with_config(Config::default().with_color(false))
            .finish()
    }
}

#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("`{name}` is a global and cannot be set")]
pub struct SealedError {
    pub start: usize,
    pub end: usize,
    pub name: SmolStr,
}

impl SealedError {
    fn to_report(&self) -> Report<'_> {
        Report::build(REPORT_ERR, (), self.start)
            .with_message("atom.eval.sealed_err")
            .with_label(
                Label::new(self.start..self.end)
                    .with_message(format!("「`{}` is a global binding」", self.name)),
            )
            .with_config(Config::default().with_color(false))
            .finish()
    }
}

#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("could not write output: {message}")]
pub struct OutputError {
    pub start: usize,
    pub end: usize,
    pub message: SmolStr,
}

impl OutputError {
    fn to_report(&self) -> Report<'_> {
        Report::build(REPORT_ERR, (), self.start)
            .with_message("atom.eval.output_err")
            .with_label(
                Label::new(self.start..self.end)
                    .with_message(format!("「{}」", self.message)),
            )
            .with_config(Config::default().with_color(false))
            .finish()
    }
}
