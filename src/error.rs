// glhandle – Object handles for WebGL and OpenGL ES resources
// Copyright (C) 2023  The glhandle authors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

use thiserror::Error;
use crate::shader::ShaderKind;

/// Everything that can go wrong while driving the context through a
/// handle.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("{object} creation error: {reason}")]
    Creation {
        object: &'static str,
        reason: String,
    },

    #[error("Missing Vertex or Fragment shader")]
    MissingShader,

    #[error("{kind} shader failed to compile: {log}")]
    Compile {
        kind: ShaderKind,
        log: String,
    },

    #[error("Program failed to link: {0}")]
    Link(String),

    #[error("This program is not linked yet")]
    NotLinked,

    #[error("Buffer does not set any attribute")]
    NoAttributes,

    #[error("Buffer attribute is not set properly: {0}")]
    InvalidAttribute(String),

    #[error("Uniform location not found: {0}")]
    UniformNotFound(String),

    #[error("Pixel data has {actual} bytes but {expected} were expected")]
    PixelData {
        expected: usize,
        actual: usize,
    },

    #[error("Unsupported pixel format: {0}")]
    UnsupportedFormat(String),

    #[error("{0}")]
    ContextUnavailable(String),

    #[error("{0}")]
    Message(String),

    #[error("Exception Error")]
    Unknown,
}

impl From<String> for Error {
    fn from(message: String) -> Error {
        Error::Message(message)
    }
}

impl From<&str> for Error {
    fn from(message: &str) -> Error {
        Error::Message(message.to_string())
    }
}

/// Turns whatever the caller has into an error and returns it as the
/// failure of the current operation. A string is wrapped, an [`Error`]
/// is passed through unchanged and `None` becomes [`Error::Unknown`].
pub fn emit_message<T, E>(error: Option<E>) -> Result<T, Error>
    where E: Into<Error>
{
    let error = match error {
        Some(error) => error.into(),
        None => Error::Unknown,
    };

    log::debug!("{}", error);

    Err(error)
}
