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

use std::rc::Rc;
use crate::context::{Backend, Context};
use crate::error::{self, Error};
use crate::shader::{Shader, ShaderKind};
use crate::program::Program;
use crate::buffer::{Buffer, BufferKind, IndexElement};
use crate::texture::Texture;
use crate::framebuffer::Framebuffer;

const DEFAULT_CLEAR_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
const DEFAULT_CLEAR_DEPTH: f32 = 1.0;

/// Entry point that owns the context and hands out the handles.
pub struct Graphics<B: Backend = glow::Context> {
    context: Rc<Context<B>>,
}

impl<B: Backend> Graphics<B> {
    pub fn new(backend: B) -> Graphics<B> {
        Graphics { context: Rc::new(Context::new(backend)) }
    }

    pub fn context(&self) -> &Rc<Context<B>> {
        &self.context
    }

    pub fn backend(&self) -> &B {
        self.context.backend()
    }

    pub fn create_shader(&self, kind: ShaderKind) -> Result<Shader<B>, Error> {
        self.created(Shader::new(Rc::clone(&self.context), kind))
    }

    /// Creates a program and, if both sources are given, compiles and
    /// links it. A compile or link failure is logged and the program is
    /// returned unlinked so the caller can try again with
    /// [`Program::compile`].
    pub fn create_program(
        &self,
        vertex_source: Option<&str>,
        fragment_source: Option<&str>,
    ) -> Result<Program<B>, Error> {
        let sources = match (vertex_source, fragment_source) {
            (Some(vertex), Some(fragment)) => Some((vertex, fragment)),
            (None, None) => None,
            _ => return self.emit_message(Some(Error::MissingShader)),
        };

        let mut program = self.created(
            Program::new(Rc::clone(&self.context))
        )?;

        if let Some((vertex, fragment)) = sources {
            if let Err(e) = program.compile(vertex, fragment) {
                log::warn!("Program left unlinked: {}", e);
            }
        }

        Ok(program)
    }

    pub fn array_buffer(&self) -> Result<Buffer<B>, Error> {
        self.created(
            Buffer::new(Rc::clone(&self.context), BufferKind::Vertex)
        )
    }

    pub fn array_buffer_from<T: bytemuck::Pod>(
        &self,
        data: &[T],
    ) -> Result<Buffer<B>, Error> {
        let buffer = self.array_buffer()?;
        buffer.data(data);
        Ok(buffer)
    }

    pub fn index_buffer(&self) -> Result<Buffer<B>, Error> {
        self.created(
            Buffer::new(Rc::clone(&self.context), BufferKind::Index)
        )
    }

    /// Creates an index buffer whose index type matches `T`.
    pub fn index_buffer_from<T: IndexElement>(
        &self,
        data: &[T],
    ) -> Result<Buffer<B>, Error> {
        let mut buffer = self.index_buffer()?;
        buffer.set_index_type(T::INDEX_TYPE);
        buffer.data(data);
        Ok(buffer)
    }

    pub fn create_texture(&self) -> Result<Texture<B>, Error> {
        self.created(Texture::new(Rc::clone(&self.context)))
    }

    /// Creates a framebuffer with no attachments. It is left bound so
    /// that rendering goes to it until [`Framebuffer::unbind`].
    pub fn create_framebuffer(
        &self,
        width: u32,
        height: u32,
    ) -> Result<Framebuffer<B>, Error> {
        self.created(
            Framebuffer::new(Rc::clone(&self.context), width, height)
        )
    }

    /// Clears to opaque black and the far plane.
    pub fn clear(&self) {
        let [r, g, b, a] = DEFAULT_CLEAR_COLOR;

        self.clear_with(r, g, b, a, DEFAULT_CLEAR_DEPTH);
    }

    pub fn clear_with(&self, r: f32, g: f32, b: f32, a: f32, depth: f32) {
        let gl = self.backend();

        gl.clear_color(r, g, b, a);
        gl.clear_depth(depth);
        gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
    }

    pub fn flush(&self) {
        self.backend().flush();
    }

    pub fn emit_message<T, E>(&self, error: Option<E>) -> Result<T, Error>
        where E: Into<Error>
    {
        error::emit_message(error)
    }

    fn created<T>(&self, result: Result<T, Error>) -> Result<T, Error> {
        result.or_else(|e| self.emit_message(Some(e)))
    }
}
