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
use crate::context::{Backend, Binding, Context};
use crate::error::Error;
use crate::shader::{Shader, ShaderKind};

/// A value for one uniform. Each variant matches one of the
/// `glUniform*` entry points. Matrices are never transposed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Uniform<'a> {
    Int1(i32),
    Int2(i32, i32),
    Int3(i32, i32, i32),
    Int4(i32, i32, i32, i32),
    Float1(f32),
    Float2(f32, f32),
    Float3(f32, f32, f32),
    Float4(f32, f32, f32, f32),
    Int1v(&'a [i32]),
    Int2v(&'a [i32]),
    Int3v(&'a [i32]),
    Int4v(&'a [i32]),
    Float1v(&'a [f32]),
    Float2v(&'a [f32]),
    Float3v(&'a [f32]),
    Float4v(&'a [f32]),
    Matrix2(&'a [f32]),
    Matrix3(&'a [f32]),
    Matrix4(&'a [f32]),
}

impl<'a> Uniform<'a> {
    /// The suffix of the GL entry point, eg `"4fv"`.
    pub fn shape(&self) -> &'static str {
        match self {
            Uniform::Int1(..) => "1i",
            Uniform::Int2(..) => "2i",
            Uniform::Int3(..) => "3i",
            Uniform::Int4(..) => "4i",
            Uniform::Float1(..) => "1f",
            Uniform::Float2(..) => "2f",
            Uniform::Float3(..) => "3f",
            Uniform::Float4(..) => "4f",
            Uniform::Int1v(..) => "1iv",
            Uniform::Int2v(..) => "2iv",
            Uniform::Int3v(..) => "3iv",
            Uniform::Int4v(..) => "4iv",
            Uniform::Float1v(..) => "1fv",
            Uniform::Float2v(..) => "2fv",
            Uniform::Float3v(..) => "3fv",
            Uniform::Float4v(..) => "4fv",
            Uniform::Matrix2(..) => "Matrix2fv",
            Uniform::Matrix3(..) => "Matrix3fv",
            Uniform::Matrix4(..) => "Matrix4fv",
        }
    }
}

/// A program together with the vertex and fragment shader attached to
/// it.
pub struct Program<B: Backend = glow::Context> {
    context: Rc<Context<B>>,
    id: B::Program,
    vertex: Shader<B>,
    fragment: Shader<B>,
    linked: bool,
    strict: bool,
}

impl<B: Backend> Program<B> {
    pub(crate) fn new(context: Rc<Context<B>>) -> Result<Program<B>, Error> {
        let gl = context.backend();

        let id = gl.create_program()
            .map_err(|reason| Error::Creation { object: "Program", reason })?;

        let shaders = Shader::new(Rc::clone(&context), ShaderKind::Vertex)
            .and_then(|vertex| {
                let fragment = Shader::new(
                    Rc::clone(&context),
                    ShaderKind::Fragment,
                )?;
                Ok((vertex, fragment))
            });

        let (vertex, fragment) = match shaders {
            Ok(shaders) => shaders,
            Err(e) => {
                gl.delete_program(id);
                return Err(e);
            },
        };

        gl.attach_shader(id, vertex.id());
        gl.attach_shader(id, fragment.id());

        Ok(Program {
            context,
            id,
            vertex,
            fragment,
            linked: false,
            strict: false,
        })
    }

    pub fn id(&self) -> B::Program {
        self.id
    }

    pub fn vertex_shader(&self) -> &Shader<B> {
        &self.vertex
    }

    pub fn fragment_shader(&self) -> &Shader<B> {
        &self.fragment
    }

    pub fn is_linked(&self) -> bool {
        self.linked
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// In strict mode setting a uniform that the program doesn’t have
    /// is an error instead of being ignored.
    pub fn set_strict(&mut self, strict: bool) {
        self.strict = strict;
    }

    pub fn toggle_strict(&mut self) {
        self.strict = !self.strict;
    }

    /// Binds a generic attribute index to a name. This only takes
    /// effect the next time the program is linked.
    pub fn bind_attribute(&self, index: u32, name: &str) {
        self.context.backend().bind_attrib_location(self.id, index, name);
    }

    /// Compiles both shaders and links them. Both shaders are always
    /// compiled so that the logs of both end up being reported. If
    /// either fails, the error of the first failing one is returned
    /// and the program isn’t linked.
    pub fn compile(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<(), Error> {
        self.linked = false;

        let vertex_result = self.vertex.compile(vertex_source);
        let fragment_result = self.fragment.compile(fragment_source);

        vertex_result?;
        fragment_result?;

        self.link()
    }

    fn link(&mut self) -> Result<(), Error> {
        let gl = self.context.backend();

        gl.link_program(self.id);

        self.linked = gl.get_program_link_status(self.id);

        if self.linked {
            Ok(())
        } else {
            let log = gl.get_program_info_log(self.id);

            log::error!("Program failed to link: {}", log);

            Err(Error::Link(log))
        }
    }

    /// Makes this the current program.
    pub fn use_program(&self) -> Result<(), Error> {
        if !self.linked {
            return Err(Error::NotLinked);
        }

        self.context.bind(Binding::Program(Some(self.id)));

        Ok(())
    }

    pub fn attrib_location(&self, name: &str) -> Option<u32> {
        self.context.backend().get_attrib_location(self.id, name)
    }

    pub fn uniform_location(&self, name: &str) -> Option<B::UniformLocation> {
        self.context.backend().get_uniform_location(self.id, name)
    }

    /// Sets a uniform by name. The program is only current while the
    /// value is being set.
    pub fn set_uniform(
        &self,
        name: &str,
        value: Uniform<'_>,
    ) -> Result<(), Error> {
        if !self.linked {
            return Err(Error::NotLinked);
        }

        let Some(location) = self.uniform_location(name)
        else {
            if self.strict {
                return Err(Error::UniformNotFound(name.to_string()));
            }

            log::debug!("uniform {} is not used in the program", name);

            return Ok(());
        };

        let _scope = self.context.scoped(Binding::Program(Some(self.id)));

        self.context.backend().set_uniform(&location, &value);

        Ok(())
    }

    pub fn uniform_1i(&self, name: &str, x: i32) -> Result<(), Error> {
        self.set_uniform(name, Uniform::Int1(x))
    }

    pub fn uniform_2i(&self, name: &str, x: i32, y: i32) -> Result<(), Error> {
        self.set_uniform(name, Uniform::Int2(x, y))
    }

    pub fn uniform_3i(
        &self,
        name: &str,
        x: i32,
        y: i32,
        z: i32,
    ) -> Result<(), Error> {
        self.set_uniform(name, Uniform::Int3(x, y, z))
    }

    pub fn uniform_4i(
        &self,
        name: &str,
        x: i32,
        y: i32,
        z: i32,
        w: i32,
    ) -> Result<(), Error> {
        self.set_uniform(name, Uniform::Int4(x, y, z, w))
    }

    pub fn uniform_1f(&self, name: &str, x: f32) -> Result<(), Error> {
        self.set_uniform(name, Uniform::Float1(x))
    }

    pub fn uniform_2f(&self, name: &str, x: f32, y: f32) -> Result<(), Error> {
        self.set_uniform(name, Uniform::Float2(x, y))
    }

    pub fn uniform_3f(
        &self,
        name: &str,
        x: f32,
        y: f32,
        z: f32,
    ) -> Result<(), Error> {
        self.set_uniform(name, Uniform::Float3(x, y, z))
    }

    pub fn uniform_4f(
        &self,
        name: &str,
        x: f32,
        y: f32,
        z: f32,
        w: f32,
    ) -> Result<(), Error> {
        self.set_uniform(name, Uniform::Float4(x, y, z, w))
    }

    pub fn uniform_1iv(&self, name: &str, v: &[i32]) -> Result<(), Error> {
        self.set_uniform(name, Uniform::Int1v(v))
    }

    pub fn uniform_2iv(&self, name: &str, v: &[i32]) -> Result<(), Error> {
        self.set_uniform(name, Uniform::Int2v(v))
    }

    pub fn uniform_3iv(&self, name: &str, v: &[i32]) -> Result<(), Error> {
        self.set_uniform(name, Uniform::Int3v(v))
    }

    pub fn uniform_4iv(&self, name: &str, v: &[i32]) -> Result<(), Error> {
        self.set_uniform(name, Uniform::Int4v(v))
    }

    pub fn uniform_1fv(&self, name: &str, v: &[f32]) -> Result<(), Error> {
        self.set_uniform(name, Uniform::Float1v(v))
    }

    pub fn uniform_2fv(&self, name: &str, v: &[f32]) -> Result<(), Error> {
        self.set_uniform(name, Uniform::Float2v(v))
    }

    pub fn uniform_3fv(&self, name: &str, v: &[f32]) -> Result<(), Error> {
        self.set_uniform(name, Uniform::Float3v(v))
    }

    pub fn uniform_4fv(&self, name: &str, v: &[f32]) -> Result<(), Error> {
        self.set_uniform(name, Uniform::Float4v(v))
    }

    pub fn uniform_matrix_2fv(
        &self,
        name: &str,
        v: &[f32],
    ) -> Result<(), Error> {
        self.set_uniform(name, Uniform::Matrix2(v))
    }

    pub fn uniform_matrix_3fv(
        &self,
        name: &str,
        v: &[f32],
    ) -> Result<(), Error> {
        self.set_uniform(name, Uniform::Matrix3(v))
    }

    pub fn uniform_matrix_4fv(
        &self,
        name: &str,
        v: &[f32],
    ) -> Result<(), Error> {
        self.set_uniform(name, Uniform::Matrix4(v))
    }

    /// Releases the program and both of its shaders.
    pub fn dispose(self) {
        drop(self);
    }
}

impl<B: Backend> Drop for Program<B> {
    fn drop(&mut self) {
        self.context.forget_program(self.id);
        self.context.backend().delete_program(self.id);
    }
}
