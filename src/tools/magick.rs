//! ImageMagick binding.
//!
//! Only image *settings* are supported, and only the ones the OCR pipeline
//! needs. A setting applies either before the input is read (`-density`
//! must precede a PDF input to affect rasterisation) or after it (`-type`,
//! `-compress`, `-background`, `-alpha`, `-depth`):
//!
//! ```text
//! magick <pre-image settings> <input...> <post-image settings> <output>
//! ```
//!
//! The binding checks nothing beyond the typed shape of its operators; the
//! validation hooks accept everything. Callers are trusted to pass settings
//! ImageMagick understands.

use crate::args::{flatten_mapping, normalize, ArgMap, ArgValue};
use crate::command::{positional_output, CommandArgs, CommandSpec, Input};
use crate::error::{Pdf2TxtError, ValidationFailure};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub const PROGRAM: &str = "magick";

/// What kind of ImageMagick argument an operator is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatorKind {
    #[default]
    Setting,
}

/// Where a setting goes relative to the input files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingPosition {
    Pre,
    Post,
}

/// One operator descriptor: `{type: "setting", position: "pre", value: 300}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageOperator {
    #[serde(rename = "type", default)]
    pub kind: OperatorKind,
    pub position: SettingPosition,
    pub value: ArgValue,
}

impl ImageOperator {
    pub fn setting(position: SettingPosition, value: impl Into<ArgValue>) -> Self {
        Self {
            kind: OperatorKind::Setting,
            position,
            value: value.into(),
        }
    }
}

/// Operators keyed by setting name (without the leading `-`).
pub type ImageOperators = IndexMap<String, ImageOperator>;

/// Construction arguments for [`Magick`]; the tool takes no options.
pub type MagickArgs = CommandArgs<ImageOperators, ()>;

impl<P> CommandArgs<ImageOperators, P> {
    /// Add a setting placed at `position`.
    pub fn setting(
        mut self,
        name: impl Into<String>,
        position: SettingPosition,
        value: impl Into<ArgValue>,
    ) -> Self {
        self.operators
            .get_or_insert_with(ImageOperators::new)
            .insert(name.into(), ImageOperator::setting(position, value));
        self
    }
}

/// Settings for rasterising PDF pages into OCR-ready TIFFs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RasterSettings {
    /// Rasterisation resolution in DPI. Default: 300.
    pub density: u32,
    /// Image type, e.g. `Grayscale`, `Bilevel`. Default: `Grayscale`.
    pub image_type: String,
    /// TIFF compression. Default: `lzw`.
    pub compress: String,
    /// Background colour flattened behind transparent areas. Default: `white`.
    pub background: String,
    /// Alpha channel handling. Default: `off`.
    pub alpha: String,
    /// Bits per channel. Default: 8.
    pub depth: u32,
}

impl Default for RasterSettings {
    fn default() -> Self {
        Self {
            density: 300,
            image_type: "Grayscale".to_string(),
            compress: "lzw".to_string(),
            background: "white".to_string(),
            alpha: "off".to_string(),
            depth: 8,
        }
    }
}

impl RasterSettings {
    /// The operator map ImageMagick needs for these settings.
    pub fn operators(&self) -> ImageOperators {
        use SettingPosition::{Post, Pre};
        IndexMap::from([
            ("density".to_string(), ImageOperator::setting(Pre, self.density)),
            ("type".to_string(), ImageOperator::setting(Post, self.image_type.as_str())),
            ("compress".to_string(), ImageOperator::setting(Post, self.compress.as_str())),
            ("background".to_string(), ImageOperator::setting(Post, self.background.as_str())),
            ("alpha".to_string(), ImageOperator::setting(Post, self.alpha.as_str())),
            ("depth".to_string(), ImageOperator::setting(Post, self.depth)),
        ])
    }
}

/// A fully assigned `magick` invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Magick {
    pre_settings: Vec<String>,
    input: Vec<String>,
    post_settings: Vec<String>,
    output: Vec<String>,
}

impl Magick {
    pub fn new(args: MagickArgs) -> Result<Self, Pdf2TxtError> {
        let (pre_settings, post_settings) = Self::assign_operators(args.operators.as_ref())?;
        Ok(Self {
            pre_settings,
            input: Self::assign_input(args.localized_input().as_ref())?,
            post_settings,
            output: positional_output(args.localized_output()),
        })
    }

    /// Convert `input` into grayscale TIFFs at `output` using `settings`.
    pub fn grayscale_tiff(
        input: impl Into<Input>,
        output: impl Into<String>,
        settings: &RasterSettings,
    ) -> Result<Self, Pdf2TxtError> {
        Self::new(
            MagickArgs::new()
                .input(input)
                .output(output)
                .operators(settings.operators()),
        )
    }

    fn assign_input(input: Option<&Input>) -> Result<Vec<String>, Pdf2TxtError> {
        match input {
            Some(i) => normalize(&i.to_value(), &[]),
            None => Ok(Vec::new()),
        }
    }

    /// Split settings by position and flatten each half to `-name value`.
    fn assign_operators(
        operators: Option<&ImageOperators>,
    ) -> Result<(Vec<String>, Vec<String>), Pdf2TxtError> {
        let Some(ops) = operators else {
            return Ok((Vec::new(), Vec::new()));
        };
        let pre = settings_at(ops, SettingPosition::Pre)?;
        let post = settings_at(ops, SettingPosition::Post)?;
        Ok((flatten_mapping(Some(&pre))?, flatten_mapping(Some(&post))?))
    }
}

/// Settings at `position`, with each value converted to its string form.
fn settings_at(ops: &ImageOperators, position: SettingPosition) -> Result<ArgMap, Pdf2TxtError> {
    ops.iter()
        .filter(|(_, op)| op.kind == OperatorKind::Setting && op.position == position)
        .map(|(name, op)| {
            op.value
                .scalar_token()
                .map(|v| (name.clone(), ArgValue::Text(v)))
                .ok_or_else(|| Pdf2TxtError::ArgumentShape {
                    shape: op.value.shape().to_string(),
                    value: format!("-{name} {}", op.value),
                })
        })
        .collect()
}

impl CommandSpec for Magick {
    fn program(&self) -> &'static str {
        PROGRAM
    }

    fn health_check(&self) -> Vec<String> {
        vec![PROGRAM.to_string(), "-version".to_string()]
    }

    // Nothing below is checked: ImageMagick reports its own errors.

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
        command.extend(self.pre_settings.iter().cloned());
        command.extend(self.input.iter().cloned());
        command.extend(self.post_settings.iter().cloned());
        command.extend(self.output.iter().cloned());
        command
    }

    fn is_noop(&self) -> bool {
        self.pre_settings.is_empty()
            && self.input.is_empty()
            && self.post_settings.is_empty()
            && self.output.is_empty()
    }
}
