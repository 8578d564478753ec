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

//! Handles for shaders, programs, buffers, textures and framebuffers
//! on top of a WebGL 1 or OpenGL ES 2 context.
//!
//! Everything starts from [`Graphics`]. Each handle owns one native
//! object and releases it when dropped. Operations that need an object
//! bound put back the previous binding when they are done.

pub mod error;
pub mod context;
pub mod shader;
pub mod program;
pub mod buffer;
pub mod texture;
pub mod framebuffer;
pub mod graphics;

#[cfg(target_arch = "wasm32")]
pub mod web;

#[cfg(all(feature = "sdl2", not(target_arch = "wasm32")))]
mod sdl_images;

#[cfg(test)]
mod testing;

pub use error::{Error, emit_message};
pub use context::{Backend, Binding, BindingScope, Context};
pub use shader::{Shader, ShaderKind};
pub use program::{Program, Uniform};
pub use buffer::{
    Attribute,
    Buffer,
    BufferKind,
    DataType,
    IndexElement,
    IndexType,
    Primitive,
    Usage,
};
pub use texture::{
    filter_constants,
    ImageSource,
    PixelType,
    RgbaImage,
    Texture,
    Wrap,
};
pub use framebuffer::{Attachment, AttachmentPoint, Framebuffer, Renderbuffer};
pub use graphics::Graphics;

#[cfg(target_arch = "wasm32")]
pub use web::CanvasOptions;
