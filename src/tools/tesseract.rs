//! Tesseract binding.
//!
//! ```text
//! tesseract <input> <output base> [-name value ...] [configfile ...]
//! ```
//!
//! Operators are flattened to `-name value` pairs (`-l eng`, `--psm` style
//! long options are not generated). The trailing group is passed through
//! untouched; in practice it names the output renderer (`txt`, `pdf`,
//! `hocr`, ...). None of it is validated.

use crate::args::{flatten_mapping, normalize, ArgMap, ArgValue};
use crate::command::{positional_output, CommandArgs, CommandSpec, Input};
use crate::error::{Pdf2TxtError, ValidationFailure};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const PROGRAM: &str = "tesseract";

/// Construction arguments for [`Tesseract`]. Options are the free-form
/// trailing config group.
pub type TesseractArgs = CommandArgs<ArgMap, ArgValue>;

/// Output renderer, selected by tesseract's built-in config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain UTF-8 text. (default)
    #[default]
    Txt,
    /// Searchable PDF with an invisible text layer.
    Pdf,
    Hocr,
    Tsv,
    Alto,
}

impl OutputFormat {
    /// The config-file token passed to tesseract.
    pub fn config_name(self) -> &'static str {
        match self {
            OutputFormat::Txt => "txt",
            OutputFormat::Pdf => "pdf",
            OutputFormat::Hocr => "hocr",
            OutputFormat::Tsv => "tsv",
            OutputFormat::Alto => "alto",
        }
    }

    /// Extension tesseract appends to the output base name.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Alto => "xml",
            other => other.config_name(),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.config_name())
    }
}

impl FromStr for OutputFormat {
    type Err = Pdf2TxtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "txt" | "text" => Ok(OutputFormat::Txt),
            "pdf" => Ok(OutputFormat::Pdf),
            "hocr" => Ok(OutputFormat::Hocr),
            "tsv" => Ok(OutputFormat::Tsv),
            "alto" => Ok(OutputFormat::Alto),
            other => Err(Pdf2TxtError::InvalidConfig(format!(
                "Unknown output format '{other}': expected txt, pdf, hocr, tsv or alto"
            ))),
        }
    }
}

/// A fully assigned `tesseract` invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Tesseract {
    input: Vec<String>,
    output: Vec<String>,
    operators: Vec<String>,
    config_files: Vec<String>,
}

impl Tesseract {
    pub fn new(args: TesseractArgs) -> Result<Self, Pdf2TxtError> {
        Ok(Self {
            input: Self::assign_input(args.localized_input().as_ref())?,
            output: positional_output(args.localized_output()),
            operators: flatten_mapping(args.operators.as_ref())?,
            config_files: normalize(args.options.as_ref().unwrap_or(&ArgValue::Absent), &[])?,
        })
    }

    /// OCR `input` (an image or a list file of images) in `language`,
    /// rendering `format` next to `output_base`.
    pub fn recognize(
        input: impl Into<Input>,
        output_base: impl Into<String>,
        language: &str,
        format: OutputFormat,
    ) -> Result<Self, Pdf2TxtError> {
        Self::new(
            TesseractArgs::new()
                .input(input)
                .output(output_base)
                .operator("l", language)
                .options(ArgValue::from(format.config_name())),
        )
    }

    fn assign_input(input: Option<&Input>) -> Result<Vec<String>, Pdf2TxtError> {
        match input {
            Some(i) => normalize(&i.to_value(), &[]),
            None => Ok(Vec::new()),
        }
    }
}

impl CommandSpec for Tesseract {
    fn program(&self) -> &'static str {
        PROGRAM
    }

    fn health_check(&self) -> Vec<String> {
        vec![PROGRAM.to_string(), "--version".to_string()]
    }

    // Nothing below is checked: tesseract reports its own errors.

    fn validate_input(&self) -> Result<(), ValidationFailure> {
        Ok(())
    }

    fn validate_output(&self) -> Result<(), ValidationFailure> {
        Ok(())
    }

    fn validate_operators(&self) -> Result<(), ValidationFailure> {
        Ok(())
    }

    fn validate_options(&self) -> Result<(), ValidationFailure> {
        Ok(())
    }

    fn prepare_command(&self) -> Vec<String> {
        let mut command = vec![PROGRAM.to_string()];
        command.extend(self.input.iter().cloned());
        command.extend(self.output.iter().cloned());
        command.extend(self.operators.iter().cloned());
        command.extend(self.config_files.iter().cloned());
        command
    }

    fn is_noop(&self) -> bool {
        self.input.is_empty()
            && self.output.is_empty()
            && self.operators.is_empty()
            && self.config_files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::testing::RecordingRunner;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_binding_runs_version_check() {
        let runner = RecordingRunner::succeeding();
        Tesseract::default().run(&runner).unwrap();
        assert_eq!(runner.calls(), vec![vec!["tesseract", "--version"]]);
    }

    #[test]
    fn list_file_to_pdf() {
        let tess = Tesseract::new(
            TesseractArgs::new()
                .input("list.txt")
                .output("out")
                .operator("l", "eng")
                .options("pdf".into()),
        )
        .unwrap();
        assert_eq!(
            tess.command_line().unwrap(),
            vec!["tesseract", "list.txt", "out", "-l", "eng", "pdf"]
        );
    }

    #[test]
    fn recognize_helper_matches_manual_construction() {
        let tess = Tesseract::recognize("pages.txt", "result", "deu+eng", OutputFormat::Hocr).unwrap();
        assert_eq!(
            tess.prepare_command(),
            vec!["tesseract", "pages.txt", "result", "-l", "deu+eng", "hocr"]
        );
    }

    #[test]
    fn several_config_files_pass_through_in_order() {
        let tess = Tesseract::new(
            TesseractArgs::new()
                .input("page.tiff")
                .output("page")
                .options(vec!["txt", "tsv"].into()),
        )
        .unwrap();
        assert_eq!(tess.prepare_command(), vec!["tesseract", "page.tiff", "page", "txt", "tsv"]);
    }

    #[test]
    fn trailing_config_alone_is_work() {
        let tess = Tesseract::new(TesseractArgs::new().options("txt".into())).unwrap();
        assert!(!tess.is_noop());
    }

    #[test]
    fn output_format_parsing() {
        assert_eq!("PDF".parse::<OutputFormat>().unwrap(), OutputFormat::Pdf);
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Txt);
        assert!(matches!(
            "docx".parse::<OutputFormat>(),
            Err(Pdf2TxtError::InvalidConfig(_))
        ));
        assert_eq!(OutputFormat::Alto.extension(), "xml");
    }
}
