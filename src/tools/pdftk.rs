//! pdftk binding.
//!
//! Token order, fixed by pdftk's grammar:
//!
//! ```text
//! pdftk <input...> [input_pw <pw...>] [<operation> <operation args...>]
//!       [output <file>] [encrypt_40bit|encrypt_128bit] [allow <perm...>]
//!       [owner_pw <pw>] [user_pw <pw>] [flatten] [need_appearances]
//!       [compress] [uncompress] [keep_first_id] [keep_final_id] [drop_xfa]
//!       [verbose] [ask|dont_ask]
//! ```
//!
//! Operators (`input_pw`, `operation`, `operation_arguments`, `allow`,
//! `owner_pw`, `user_pw`) and options (`encrypt`, the boolean flags and
//! `ask`) are read from [`ArgMap`]s by name.

use crate::args::{
    format_flag_arg, format_presence_flag, lookup, normalize, normalize_keyed, ArgMap, ArgValue,
};
use crate::command::{CommandArgs, CommandSpec, Input};
use crate::error::{ArgCategory, Pdf2TxtError, ValidationFailure};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

pub const PROGRAM: &str = "pdftk";

/// Sentinel asking pdftk to prompt for the value on stdin.
pub const PROMPT: &str = "PROMPT";

/// Construction arguments for [`PdfTk`].
pub type PdfArgs = CommandArgs<ArgMap, ArgMap>;

static OUTPUT_PDF: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^.+\.pdf$").expect("valid regex"));
static HANDLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([A-Z]+)=(.*)$").expect("valid regex"));
static NON_BLANK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S").expect("valid regex"));

// ── Enumerations ─────────────────────────────────────────────────────────

/// The operations pdftk accepts after its inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PdfOperation {
    Cat,
    Shuffle,
    Burst,
    Rotate,
    GenerateFdf,
    FillForm,
    Background,
    Multibackground,
    Stamp,
    Multistamp,
    DumpData,
    DumpDataUtf8,
    DumpDataFields,
    DumpDataFieldsUtf8,
    DumpDataAnnots,
    UpdateInfo,
    UpdateInfoUtf8,
    AttachFiles,
    UnpackFiles,
}

impl PdfOperation {
    pub const ALL: [PdfOperation; 19] = [
        PdfOperation::Cat,
        PdfOperation::Shuffle,
        PdfOperation::Burst,
        PdfOperation::Rotate,
        PdfOperation::GenerateFdf,
        PdfOperation::FillForm,
        PdfOperation::Background,
        PdfOperation::Multibackground,
        PdfOperation::Stamp,
        PdfOperation::Multistamp,
        PdfOperation::DumpData,
        PdfOperation::DumpDataUtf8,
        PdfOperation::DumpDataFields,
        PdfOperation::DumpDataFieldsUtf8,
        PdfOperation::DumpDataAnnots,
        PdfOperation::UpdateInfo,
        PdfOperation::UpdateInfoUtf8,
        PdfOperation::AttachFiles,
        PdfOperation::UnpackFiles,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PdfOperation::Cat => "cat",
            PdfOperation::Shuffle => "shuffle",
            PdfOperation::Burst => "burst",
            PdfOperation::Rotate => "rotate",
            PdfOperation::GenerateFdf => "generate_fdf",
            PdfOperation::FillForm => "fill_form",
            PdfOperation::Background => "background",
            PdfOperation::Multibackground => "multibackground",
            PdfOperation::Stamp => "stamp",
            PdfOperation::Multistamp => "multistamp",
            PdfOperation::DumpData => "dump_data",
            PdfOperation::DumpDataUtf8 => "dump_data_utf8",
            PdfOperation::DumpDataFields => "dump_data_fields",
            PdfOperation::DumpDataFieldsUtf8 => "dump_data_fields_utf8",
            PdfOperation::DumpDataAnnots => "dump_data_annots",
            PdfOperation::UpdateInfo => "update_info",
            PdfOperation::UpdateInfoUtf8 => "update_info_utf8",
            PdfOperation::AttachFiles => "attach_files",
            PdfOperation::UnpackFiles => "unpack_files",
        }
    }
}

impl fmt::Display for PdfOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PdfOperation {
    type Err = ValidationFailure;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PdfOperation::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| {
                ValidationFailure::new(
                    ArgCategory::Operator,
                    s,
                    format!("Operation must be one of: {}", join(PdfOperation::ALL)),
                )
            })
    }
}

/// Permissions grantable to an encrypted output with `allow`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    Printing,
    DegradedPrinting,
    ModifyContents,
    Assembly,
    CopyContents,
    ScreenReaders,
    ModifyAnnotations,
    FillIn,
    AllFeatures,
}

impl Permission {
    pub const ALL: [Permission; 9] = [
        Permission::Printing,
        Permission::DegradedPrinting,
        Permission::ModifyContents,
        Permission::Assembly,
        Permission::CopyContents,
        Permission::ScreenReaders,
        Permission::ModifyAnnotations,
        Permission::FillIn,
        Permission::AllFeatures,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Permission::Printing => "Printing",
            Permission::DegradedPrinting => "DegradedPrinting",
            Permission::ModifyContents => "ModifyContents",
            Permission::Assembly => "Assembly",
            Permission::CopyContents => "CopyContents",
            Permission::ScreenReaders => "ScreenReaders",
            Permission::ModifyAnnotations => "ModifyAnnotations",
            Permission::FillIn => "FillIn",
            Permission::AllFeatures => "AllFeatures",
        }
    }

    fn is_known(s: &str) -> bool {
        Permission::ALL.iter().any(|p| p.as_str() == s)
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Permission> for ArgValue {
    fn from(p: Permission) -> Self {
        ArgValue::Text(p.as_str().to_string())
    }
}

impl From<PdfOperation> for ArgValue {
    fn from(op: PdfOperation) -> Self {
        ArgValue::Text(op.as_str().to_string())
    }
}

fn join<T: fmt::Display>(items: impl IntoIterator<Item = T>) -> String {
    items
        .into_iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

// ── Token groups ─────────────────────────────────────────────────────────

/// Tokens derived from operators, one group per operator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PdfOperatorTokens {
    pub input_pw: Vec<String>,
    pub operation: Vec<String>,
    pub operation_arguments: Vec<String>,
    pub allow: Vec<String>,
    pub owner_pw: Vec<String>,
    pub user_pw: Vec<String>,
}

/// Tokens derived from options, one group per option.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PdfOptionTokens {
    pub encrypt: Vec<String>,
    pub flatten: Vec<String>,
    pub need_appearances: Vec<String>,
    pub compress: Vec<String>,
    pub uncompress: Vec<String>,
    pub keep_first_id: Vec<String>,
    pub keep_final_id: Vec<String>,
    pub drop_xfa: Vec<String>,
    pub verbose: Vec<String>,
    pub ask: Vec<String>,
}

impl PdfOptionTokens {
    /// The boolean flag groups, in command-line order.
    fn flags(&self) -> [(&'static str, &Vec<String>); 8] {
        [
            ("flatten", &self.flatten),
            ("need_appearances", &self.need_appearances),
            ("compress", &self.compress),
            ("uncompress", &self.uncompress),
            ("keep_first_id", &self.keep_first_id),
            ("keep_final_id", &self.keep_final_id),
            ("drop_xfa", &self.drop_xfa),
            ("verbose", &self.verbose),
        ]
    }
}

// ── Binding ──────────────────────────────────────────────────────────────

/// A fully assigned pdftk invocation.
///
/// ```rust
/// use edgequake_pdf2txt::{CommandSpec, PdfArgs, PdfTk};
///
/// let pdftk = PdfTk::new(
///     PdfArgs::new()
///         .input("PROMPT")
///         .output("page_%04d.pdf")
///         .operator("operation", "burst"),
/// )
/// .unwrap();
/// assert_eq!(
///     pdftk.command_line().unwrap(),
///     ["pdftk", "PROMPT", "burst", "output", "page_%04d.pdf"]
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PdfTk {
    input: Vec<String>,
    output: Vec<String>,
    operators: PdfOperatorTokens,
    options: PdfOptionTokens,
    /// `input_pw` came from a handle mapping, so its tokens read `A=pw`.
    #[serde(skip)]
    keyed_input_pw: bool,
}

impl PdfTk {
    /// Assign every attribute from `args`.
    ///
    /// # Errors
    /// [`Pdf2TxtError::InvalidConfig`] for an encryption level other than 40
    /// or 128; [`Pdf2TxtError::ArgumentShape`] for a value of the wrong shape.
    pub fn new(args: PdfArgs) -> Result<Self, Pdf2TxtError> {
        Ok(Self {
            input: Self::assign_input(args.localized_input().as_ref())?,
            output: Self::assign_output(args.localized_output())?,
            operators: Self::assign_operators(args.operators.as_ref())?,
            options: Self::assign_options(args.options.as_ref())?,
            keyed_input_pw: args
                .operators
                .as_ref()
                .is_some_and(|ops| matches!(lookup(ops, "input_pw"), ArgValue::Map(_))),
        })
    }

    /// Build an invocation of `operation`, with `operation_args` following it.
    pub fn for_operation(
        operation: PdfOperation,
        args: PdfArgs,
        operation_args: impl Into<ArgValue>,
    ) -> Result<Self, Pdf2TxtError> {
        let args = args
            .operator("operation", operation)
            .operator("operation_arguments", operation_args);
        Self::new(args)
    }

    /// `pdftk <input> burst output <pattern>`.
    pub fn burst(input: impl Into<Input>, pattern: impl Into<String>) -> Result<Self, Pdf2TxtError> {
        Self::for_operation(
            PdfOperation::Burst,
            PdfArgs::new().input(input).output(pattern),
            ArgValue::Absent,
        )
    }

    pub fn input_tokens(&self) -> &[String] {
        &self.input
    }

    pub fn output_tokens(&self) -> &[String] {
        &self.output
    }

    pub fn operator_tokens(&self) -> &PdfOperatorTokens {
        &self.operators
    }

    pub fn option_tokens(&self) -> &PdfOptionTokens {
        &self.options
    }

    fn assign_input(input: Option<&Input>) -> Result<Vec<String>, Pdf2TxtError> {
        match input {
            Some(i) => normalize_keyed(&i.to_value(), &[]),
            None => Ok(Vec::new()),
        }
    }

    fn assign_output(output: Option<String>) -> Result<Vec<String>, Pdf2TxtError> {
        format_flag_arg("output", &ArgValue::from(output))
    }

    fn assign_operators(operators: Option<&ArgMap>) -> Result<PdfOperatorTokens, Pdf2TxtError> {
        let Some(ops) = operators else {
            return Ok(PdfOperatorTokens::default());
        };
        let get = |name: &str| lookup(ops, name);

        let mut input_pw = normalize_keyed(get("input_pw"), &[])?;
        if !input_pw.is_empty() || matches!(get("input_pw"), ArgValue::List(_)) {
            input_pw.insert(0, "input_pw".to_string());
        }

        Ok(PdfOperatorTokens {
            input_pw,
            operation: normalize(get("operation"), &[])?,
            operation_arguments: normalize(get("operation_arguments"), &[])?,
            allow: format_flag_arg("allow", get("allow"))?,
            owner_pw: format_flag_arg("owner_pw", get("owner_pw"))?,
            user_pw: format_flag_arg("user_pw", get("user_pw"))?,
        })
    }

    fn assign_options(options: Option<&ArgMap>) -> Result<PdfOptionTokens, Pdf2TxtError> {
        let Some(opts) = options else {
            return Ok(PdfOptionTokens::default());
        };
        let flag = |name: &str| format_presence_flag(opts, name, &[]);
        let ask = match opts.get("ask") {
            Some(v) if v.is_truthy() => "ask",
            _ => "dont_ask",
        };

        Ok(PdfOptionTokens {
            encrypt: format_encrypt(lookup(opts, "encrypt"))?,
            flatten: flag("flatten"),
            need_appearances: flag("need_appearances"),
            compress: flag("compress"),
            uncompress: flag("uncompress"),
            keep_first_id: flag("keep_first_id"),
            keep_final_id: flag("keep_final_id"),
            drop_xfa: flag("drop_xfa"),
            verbose: flag("verbose"),
            ask: vec![ask.to_string()],
        })
    }

    /// Input paths with any `HANDLE=` prefix removed.
    fn input_paths(&self) -> impl Iterator<Item = &str> {
        self.input.iter().map(|token| strip_handle(token))
    }

    fn validate_operation(&self) -> Result<(), ValidationFailure> {
        match self.operators.operation.as_slice() {
            [] => Ok(()),
            [op] => op.parse::<PdfOperation>().map(|_| ()),
            many => Err(ValidationFailure::new(
                ArgCategory::Operator,
                many.join(" "),
                "Exactly one operation may be given",
            )),
        }
    }

    fn validate_permissions(&self) -> Result<(), ValidationFailure> {
        let unknown: Vec<&str> = self
            .operators
            .allow
            .iter()
            .skip(1)
            .map(String::as_str)
            .filter(|p| !Permission::is_known(p))
            .collect();
        if unknown.is_empty() {
            Ok(())
        } else {
            Err(ValidationFailure::new(
                ArgCategory::Operator,
                unknown.join(", "),
                format!("Permission must be one of: {}", join(Permission::ALL)),
            ))
        }
    }

    fn validate_passwords(&self) -> Result<(), ValidationFailure> {
        let ops = &self.operators;
        for (name, group) in [
            ("input_pw", &ops.input_pw),
            ("owner_pw", &ops.owner_pw),
            ("user_pw", &ops.user_pw),
        ] {
            let Some((_, values)) = group.split_first() else {
                continue;
            };
            let keyed = name == "input_pw" && self.keyed_input_pw;
            let blank = values.is_empty()
                || values.iter().any(|v| {
                    let pw = if keyed { strip_handle(v) } else { v.as_str() };
                    !NON_BLANK.is_match(pw)
                });
            if blank {
                return Err(ValidationFailure::new(
                    ArgCategory::Operator,
                    group.join(" "),
                    format!("{name} must not be empty"),
                ));
            }
        }
        Ok(())
    }
}

/// `A=path` → `path`; anything else unchanged.
fn strip_handle(token: &str) -> &str {
    HANDLE
        .captures(token)
        .and_then(|c| c.get(2))
        .map_or(token, |m| m.as_str())
}

/// Map an encryption strength to its pdftk keyword.
///
/// Only 40 and 128 exist; anything else is a caller bug rather than bad
/// runtime data, so it is reported as [`Pdf2TxtError::InvalidConfig`].
pub fn format_encrypt(level: &ArgValue) -> Result<Vec<String>, Pdf2TxtError> {
    match level {
        ArgValue::Absent => Ok(Vec::new()),
        ArgValue::Int(40) => Ok(vec!["encrypt_40bit".to_string()]),
        ArgValue::Int(128) => Ok(vec!["encrypt_128bit".to_string()]),
        other => Err(Pdf2TxtError::InvalidConfig(format!(
            "Invalid encrypt option {other}. Value must be 40 or 128"
        ))),
    }
}

fn expect_one_of(group: &[String], allowed: &[&str]) -> Result<(), ValidationFailure> {
    match group.first() {
        Some(token) if !allowed.contains(&token.as_str()) => Err(ValidationFailure::new(
            ArgCategory::Option,
            token.clone(),
            format!("Option must be one of: {}", allowed.join(", ")),
        )),
        _ => Ok(()),
    }
}

impl CommandSpec for PdfTk {
    fn program(&self) -> &'static str {
        PROGRAM
    }

    fn health_check(&self) -> Vec<String> {
        vec![PROGRAM.to_string(), "--version".to_string()]
    }

    /// Every input must be an existing file or the `PROMPT` sentinel.
    fn validate_input(&self) -> Result<(), ValidationFailure> {
        for path in self.input_paths() {
            if path != PROMPT && !Path::new(path).is_file() {
                return Err(ValidationFailure::new(
                    ArgCategory::Input,
                    path,
                    "Input must be an existing file or PROMPT",
                ));
            }
        }
        Ok(())
    }

    /// The output must be a `.pdf` name (or `PROMPT`) and must not repeat
    /// one of the inputs, `PROMPT` included.
    fn validate_output(&self) -> Result<(), ValidationFailure> {
        for target in self.output.iter().skip(1) {
            if target != PROMPT && !OUTPUT_PDF.is_match(target) {
                return Err(ValidationFailure::new(
                    ArgCategory::Output,
                    target.clone(),
                    "Output must be a .pdf file name or PROMPT",
                ));
            }
            if self.input_paths().any(|i| i == target.as_str()) {
                return Err(ValidationFailure::new(
                    ArgCategory::Output,
                    target.clone(),
                    "Output would overwrite an input file",
                ));
            }
        }
        Ok(())
    }

    fn validate_operators(&self) -> Result<(), ValidationFailure> {
        self.validate_operation()?;
        self.validate_permissions()?;
        self.validate_passwords()
    }

    fn validate_options(&self) -> Result<(), ValidationFailure> {
        let opts = &self.options;
        expect_one_of(&opts.encrypt, &["encrypt_40bit", "encrypt_128bit"])?;
        for (name, group) in opts.flags() {
            expect_one_of(group, &[name])?;
        }
        expect_one_of(&opts.ask, &["ask", "dont_ask"])
    }

    fn prepare_command(&self) -> Vec<String> {
        let ops = &self.operators;
        let opts = &self.options;
        let mut command = vec![PROGRAM.to_string()];
        for group in [
            &self.input,
            &ops.input_pw,
            &ops.operation,
            &ops.operation_arguments,
            &self.output,
            &opts.encrypt,
            &ops.allow,
            &ops.owner_pw,
            &ops.user_pw,
        ] {
            command.extend(group.iter().cloned());
        }
        for (_, group) in opts.flags() {
            command.extend(group.iter().cloned());
        }
        command.extend(opts.ask.iter().cloned());
        command
    }

    /// Options and non-operation operators alone are not work.
    fn is_noop(&self) -> bool {
        self.input.is_empty() && self.output.is_empty() && self.operators.operation.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::testing::RecordingRunner;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    /// A temp dir containing `names` as empty files; returns their paths.
    fn fixture(names: &[&str]) -> (TempDir, Vec<String>) {
        let dir = TempDir::new().unwrap();
        let paths = names
            .iter()
            .map(|n| {
                let p = dir.path().join(n);
                fs::write(&p, b"%PDF-1.4\n").unwrap();
                p.to_string_lossy().into_owned()
            })
            .collect();
        (dir, paths)
    }

    fn category(err: Pdf2TxtError) -> (ArgCategory, String) {
        let v = err.as_validation().expect("validation failure").clone();
        (v.category, v.value)
    }

    #[test]
    fn empty_binding_runs_version_check() {
        let pdftk = PdfTk::default();
        assert!(pdftk.is_noop());
        let runner = RecordingRunner::succeeding();
        let out = pdftk.run(&runner).unwrap();
        assert!(out.success());
        assert_eq!(runner.calls(), vec![vec!["pdftk", "--version"]]);
    }

    #[test]
    fn options_alone_are_still_noop() {
        let pdftk = PdfTk::new(PdfArgs::new().option("flatten", true)).unwrap();
        assert!(pdftk.is_noop());
        assert_eq!(pdftk.command_line().unwrap(), vec!["pdftk", "--version"]);
    }

    #[test]
    fn missing_input_is_rejected_before_running() {
        let pdftk = PdfTk::new(PdfArgs::new().input("missing.pdf")).unwrap();
        let runner = RecordingRunner::succeeding();
        let (cat, value) = category(pdftk.run(&runner).unwrap_err());
        assert_eq!(cat, ArgCategory::Input);
        assert_eq!(value, "missing.pdf");
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn prompt_input_skips_filesystem() {
        let pdftk = PdfTk::new(PdfArgs::new().input(PROMPT).output("out.pdf")).unwrap();
        assert!(pdftk.validate().is_ok());
    }

    #[test]
    fn output_must_not_clobber_input() {
        let (_dir, paths) = fixture(&["report.pdf"]);
        let pdftk = PdfTk::new(
            PdfArgs::new()
                .input(paths[0].as_str())
                .output(paths[0].as_str())
                .operator("operation", "cat"),
        )
        .unwrap();
        let err = pdftk.validate().unwrap_err();
        assert_eq!(err.category, ArgCategory::Output);
        assert_eq!(err.value, paths[0]);
    }

    #[test]
    fn prompt_output_must_not_repeat_prompt_input() {
        let pdftk = PdfTk::new(
            PdfArgs::new()
                .input(PROMPT)
                .output(PROMPT)
                .operator("operation", "cat"),
        )
        .unwrap();
        let err = pdftk.validate().unwrap_err();
        assert_eq!(err.category, ArgCategory::Output);
        assert_eq!(err.value, PROMPT);
    }

    #[test]
    fn output_needs_pdf_extension() {
        let (_dir, paths) = fixture(&["in.pdf"]);
        let pdftk = PdfTk::new(PdfArgs::new().input(paths[0].as_str()).output("report.txt")).unwrap();
        let err = pdftk.validate().unwrap_err();
        assert_eq!(err.category, ArgCategory::Output);
        assert_eq!(err.value, "report.txt");
    }

    #[test]
    fn input_failure_wins_over_output_failure() {
        let pdftk = PdfTk::new(PdfArgs::new().input("missing.pdf").output("report.txt")).unwrap();
        let err = pdftk.validate().unwrap_err();
        assert_eq!(err.category, ArgCategory::Input);
    }

    #[test]
    fn unknown_operation_is_rejected() {
        let pdftk = PdfTk::new(
            PdfArgs::new()
                .input(PROMPT)
                .operator("operation", "not_a_real_op"),
        )
        .unwrap();
        let err = pdftk.validate().unwrap_err();
        assert_eq!(err.category, ArgCategory::Operator);
        assert_eq!(err.value, "not_a_real_op");
    }

    #[test]
    fn two_operations_are_rejected() {
        let pdftk = PdfTk::new(
            PdfArgs::new()
                .input(PROMPT)
                .operator("operation", vec!["cat", "burst"]),
        )
        .unwrap();
        assert_eq!(pdftk.validate().unwrap_err().value, "cat burst");
    }

    #[test]
    fn burst_assembles_in_grammar_order() {
        let (_dir, paths) = fixture(&["doc.pdf"]);
        let pdftk = PdfTk::burst(paths[0].as_str(), "page_%04d.pdf").unwrap();
        assert_eq!(
            pdftk.command_line().unwrap(),
            vec!["pdftk", paths[0].as_str(), "burst", "output", "page_%04d.pdf"]
        );
    }

    #[test]
    fn every_operation_name_parses() {
        for op in PdfOperation::ALL {
            assert_eq!(op.as_str().parse::<PdfOperation>().unwrap(), op);
        }
    }

    #[test]
    fn encrypt_levels_map_to_keywords() {
        assert_eq!(format_encrypt(&40.into()).unwrap(), vec!["encrypt_40bit"]);
        assert_eq!(format_encrypt(&128.into()).unwrap(), vec!["encrypt_128bit"]);
        assert!(format_encrypt(&ArgValue::Absent).unwrap().is_empty());
    }

    #[test]
    fn unsupported_encrypt_level_is_config_error() {
        let err = PdfTk::new(PdfArgs::new().input(PROMPT).option("encrypt", 64)).unwrap_err();
        assert!(matches!(err, Pdf2TxtError::InvalidConfig(_)), "got {err:?}");
        assert!(err.as_validation().is_none());
    }

    #[test]
    fn unknown_permissions_are_reported_together() {
        let pdftk = PdfTk::new(
            PdfArgs::new()
                .input(PROMPT)
                .output("locked.pdf")
                .operator("allow", vec!["Printing", "Teleport", "Juggling"])
                .operator("owner_pw", "secret"),
        )
        .unwrap();
        let err = pdftk.validate().unwrap_err();
        assert_eq!(err.category, ArgCategory::Operator);
        assert_eq!(err.value, "Teleport, Juggling");
    }

    #[test]
    fn blank_passwords_are_rejected() {
        for name in ["owner_pw", "user_pw", "input_pw"] {
            let pdftk = PdfTk::new(PdfArgs::new().input(PROMPT).operator(name, "   ")).unwrap();
            let err = pdftk.validate().unwrap_err();
            assert_eq!(err.category, ArgCategory::Operator, "{name}");
        }
    }

    #[test]
    fn blank_keyed_input_password_is_rejected() {
        let pw = ArgMap::from([("A".to_string(), ArgValue::from(""))]);
        let pdftk = PdfTk::new(PdfArgs::new().input(PROMPT).operator("input_pw", pw)).unwrap();
        assert_eq!(pdftk.validate().unwrap_err().value, "input_pw A=");
    }

    #[test]
    fn plain_password_keeps_handle_like_text() {
        for name in ["input_pw", "owner_pw", "user_pw"] {
            let pdftk = PdfTk::new(PdfArgs::new().input(PROMPT).operator(name, "X=")).unwrap();
            assert!(pdftk.validate().is_ok(), "{name}");
        }
    }

    #[test]
    fn keyed_inputs_are_checked_by_path() {
        let (_dir, paths) = fixture(&["a.pdf", "b.pdf"]);
        let named = indexmap::IndexMap::from([
            ("A".to_string(), paths[0].clone()),
            ("B".to_string(), paths[1].clone()),
        ]);
        let pdftk = PdfTk::new(
            PdfArgs::new()
                .input(named)
                .output(paths[1].as_str())
                .operator("operation", PdfOperation::Cat)
                .operator("operation_arguments", vec!["A", "B"]),
        )
        .unwrap();
        assert_eq!(pdftk.input_tokens()[0], format!("A={}", paths[0]));
        assert!(pdftk.validate_input().is_ok());
        // B's path is also the output.
        assert_eq!(pdftk.validate().unwrap_err().category, ArgCategory::Output);
    }

    #[test]
    fn full_command_token_order() {
        let (_dir, paths) = fixture(&["in.pdf"]);
        let pdftk = PdfTk::new(
            PdfArgs::new()
                .input(paths[0].as_str())
                .output("secured.pdf")
                .operator("input_pw", "old")
                .operator("operation", "cat")
                .operator("operation_arguments", vec!["1-3"])
                .operator("allow", vec![Permission::Printing, Permission::FillIn])
                .operator("owner_pw", "owner")
                .operator("user_pw", "user")
                .option("encrypt", 128)
                .option("flatten", true)
                .option("compress", true)
                .option("drop_xfa", true)
                .option("verbose", true),
        )
        .unwrap();
        assert_eq!(
            pdftk.command_line().unwrap(),
            vec![
                "pdftk",
                paths[0].as_str(),
                "input_pw",
                "old",
                "cat",
                "1-3",
                "output",
                "secured.pdf",
                "encrypt_128bit",
                "allow",
                "Printing",
                "FillIn",
                "owner_pw",
                "owner",
                "user_pw",
                "user",
                "flatten",
                "compress",
                "drop_xfa",
                "verbose",
                "dont_ask",
            ]
        );
    }

    #[test]
    fn ask_is_emitted_only_with_options() {
        let without = PdfTk::new(PdfArgs::new().input(PROMPT)).unwrap();
        assert!(without.option_tokens().ask.is_empty());

        let asking = PdfTk::new(PdfArgs::new().input(PROMPT).option("ask", true)).unwrap();
        assert_eq!(asking.option_tokens().ask, vec!["ask"]);
    }

    #[test]
    fn windows_platform_localizes_paths() {
        let pdftk = PdfTk::new(
            PdfArgs::new()
                .input("PROMPT")
                .output("out/page_%04d.pdf")
                .platform(crate::args::Platform::Windows),
        )
        .unwrap();
        assert_eq!(pdftk.output_tokens(), ["output", "out\\page_%04d.pdf"]);
    }
}
