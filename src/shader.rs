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

use std::fmt;
use std::rc::Rc;
use crate::context::{Backend, Context};
use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderKind {
    Vertex,
    Fragment,
}

impl ShaderKind {
    pub fn gl(self) -> u32 {
        match self {
            ShaderKind::Vertex => glow::VERTEX_SHADER,
            ShaderKind::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for ShaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderKind::Vertex => write!(f, "Vertex"),
            ShaderKind::Fragment => write!(f, "Fragment"),
        }
    }
}

pub struct Shader<B: Backend = glow::Context> {
    context: Rc<Context<B>>,
    id: B::Shader,
    kind: ShaderKind,
    compiled: bool,
}

impl<B: Backend> Shader<B> {
    pub(crate) fn new(
        context: Rc<Context<B>>,
        kind: ShaderKind,
    ) -> Result<Shader<B>, Error> {
        let id = context.backend().create_shader(kind.gl())
            .map_err(|reason| Error::Creation { object: "Shader", reason })?;

        Ok(Shader { context, id, kind, compiled: false })
    }

    pub fn id(&self) -> B::Shader {
        self.id
    }

    pub fn kind(&self) -> ShaderKind {
        self.kind
    }

    pub fn is_compiled(&self) -> bool {
        self.compiled
    }

    /// Replaces the source and compiles it. A failure leaves the
    /// shader uncompiled so it can be tried again with other source.
    pub fn compile(&mut self, source: &str) -> Result<(), Error> {
        let gl = self.context.backend();

        gl.shader_source(self.id, source);
        gl.compile_shader(self.id);

        self.compiled = gl.get_shader_compile_status(self.id);

        if self.compiled {
            Ok(())
        } else {
            let log = gl.get_shader_info_log(self.id);

            log::error!("{} shader failed to compile: {}", self.kind, log);

            Err(Error::Compile { kind: self.kind, log })
        }
    }

    /// Releases the native shader. Dropping the handle does the same.
    pub fn dispose(self) {
        drop(self);
    }
}

impl<B: Backend> Drop for Shader<B> {
    fn drop(&mut self) {
        self.context.backend().delete_shader(self.id);
    }
}
