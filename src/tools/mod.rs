//! Tool bindings, one per external binary.
//!
//! | Binding | Binary | Validated |
//! |---------|--------|-----------|
//! | [`pdftk::PdfTk`] | `pdftk` | inputs, output, operation, permissions, passwords, options |
//! | [`magick::Magick`] | `magick` | nothing |
//! | [`tesseract::Tesseract`] | `tesseract` | nothing |

pub mod magick;
pub mod pdftk;
pub mod tesseract;
