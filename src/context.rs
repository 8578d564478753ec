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

//! The seam between the handles and the native context.
//!
//! [`Backend`] is the subset of the GL ES 2 / WebGL 1 API that the
//! handles need. It is implemented for [`glow::Context`]. [`Context`]
//! wraps a backend together with a shadow copy of the current
//! bindings so that the handles can bind their objects for the
//! duration of one operation and put back whatever was bound before.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::hash::Hash;
use glow::HasContext;
use crate::program::Uniform;

pub trait Backend {
    type Shader: Copy + Debug + Eq + Hash;
    type Program: Copy + Debug + Eq + Hash;
    type Buffer: Copy + Debug + Eq + Hash;
    type Texture: Copy + Debug + Eq + Hash;
    type Framebuffer: Copy + Debug + Eq + Hash;
    type Renderbuffer: Copy + Debug + Eq + Hash;
    type UniformLocation: Clone + Debug;

    fn create_shader(&self, shader_type: u32) -> Result<Self::Shader, String>;
    fn shader_source(&self, shader: Self::Shader, source: &str);
    fn compile_shader(&self, shader: Self::Shader);
    fn get_shader_compile_status(&self, shader: Self::Shader) -> bool;
    fn get_shader_info_log(&self, shader: Self::Shader) -> String;
    fn delete_shader(&self, shader: Self::Shader);

    fn create_program(&self) -> Result<Self::Program, String>;
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn bind_attrib_location(
        &self,
        program: Self::Program,
        index: u32,
        name: &str,
    );
    fn link_program(&self, program: Self::Program);
    fn get_program_link_status(&self, program: Self::Program) -> bool;
    fn get_program_info_log(&self, program: Self::Program) -> String;
    fn use_program(&self, program: Option<Self::Program>);
    fn delete_program(&self, program: Self::Program);
    fn get_attrib_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<u32>;
    fn get_uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation>;
    fn set_uniform(
        &self,
        location: &Self::UniformLocation,
        value: &Uniform<'_>,
    );

    fn create_buffer(&self) -> Result<Self::Buffer, String>;
    fn bind_buffer(&self, target: u32, buffer: Option<Self::Buffer>);
    fn buffer_data_u8_slice(&self, target: u32, data: &[u8], usage: u32);
    fn delete_buffer(&self, buffer: Self::Buffer);
    fn enable_vertex_attrib_array(&self, index: u32);
    fn vertex_attrib_pointer_f32(
        &self,
        index: u32,
        size: i32,
        data_type: u32,
        normalized: bool,
        stride: i32,
        offset: i32,
    );
    fn draw_arrays(&self, mode: u32, first: i32, count: i32);
    fn draw_elements(
        &self,
        mode: u32,
        count: i32,
        element_type: u32,
        offset: i32,
    );

    fn create_texture(&self) -> Result<Self::Texture, String>;
    fn active_texture(&self, unit: u32);
    fn bind_texture(&self, target: u32, texture: Option<Self::Texture>);
    #[allow(clippy::too_many_arguments)]
    fn tex_image_2d(
        &self,
        target: u32,
        level: i32,
        internal_format: i32,
        width: i32,
        height: i32,
        border: i32,
        format: u32,
        ty: u32,
        pixels: Option<&[u8]>,
    );
    fn tex_parameter_i32(&self, target: u32, parameter: u32, value: i32);
    fn generate_mipmap(&self, target: u32);
    fn delete_texture(&self, texture: Self::Texture);

    fn create_framebuffer(&self) -> Result<Self::Framebuffer, String>;
    fn bind_framebuffer(
        &self,
        target: u32,
        framebuffer: Option<Self::Framebuffer>,
    );
    fn framebuffer_texture_2d(
        &self,
        target: u32,
        attachment: u32,
        texture_target: u32,
        texture: Option<Self::Texture>,
        level: i32,
    );
    fn framebuffer_renderbuffer(
        &self,
        target: u32,
        attachment: u32,
        renderbuffer_target: u32,
        renderbuffer: Option<Self::Renderbuffer>,
    );
    fn check_framebuffer_status(&self, target: u32) -> u32;
    fn delete_framebuffer(&self, framebuffer: Self::Framebuffer);

    fn create_renderbuffer(&self) -> Result<Self::Renderbuffer, String>;
    fn bind_renderbuffer(
        &self,
        target: u32,
        renderbuffer: Option<Self::Renderbuffer>,
    );
    fn renderbuffer_storage(
        &self,
        target: u32,
        internal_format: u32,
        width: i32,
        height: i32,
    );
    fn delete_renderbuffer(&self, renderbuffer: Self::Renderbuffer);

    fn clear_color(&self, red: f32, green: f32, blue: f32, alpha: f32);
    fn clear_depth(&self, depth: f32);
    fn clear(&self, mask: u32);
    fn flush(&self);
}

// The methods share their names with HasContext so every call below
// has to name the trait explicitly.
impl Backend for glow::Context {
    type Shader = <glow::Context as HasContext>::Shader;
    type Program = <glow::Context as HasContext>::Program;
    type Buffer = <glow::Context as HasContext>::Buffer;
    type Texture = <glow::Context as HasContext>::Texture;
    type Framebuffer = <glow::Context as HasContext>::Framebuffer;
    type Renderbuffer = <glow::Context as HasContext>::Renderbuffer;
    type UniformLocation = <glow::Context as HasContext>::UniformLocation;

    fn create_shader(&self, shader_type: u32) -> Result<Self::Shader, String> {
        unsafe { HasContext::create_shader(self, shader_type) }
    }

    fn shader_source(&self, shader: Self::Shader, source: &str) {
        unsafe { HasContext::shader_source(self, shader, source) }
    }

    fn compile_shader(&self, shader: Self::Shader) {
        unsafe { HasContext::compile_shader(self, shader) }
    }

    fn get_shader_compile_status(&self, shader: Self::Shader) -> bool {
        unsafe { HasContext::get_shader_compile_status(self, shader) }
    }

    fn get_shader_info_log(&self, shader: Self::Shader) -> String {
        unsafe { HasContext::get_shader_info_log(self, shader) }
    }

    fn delete_shader(&self, shader: Self::Shader) {
        unsafe { HasContext::delete_shader(self, shader) }
    }

    fn create_program(&self) -> Result<Self::Program, String> {
        unsafe { HasContext::create_program(self) }
    }

    fn attach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { HasContext::attach_shader(self, program, shader) }
    }

    fn bind_attrib_location(
        &self,
        program: Self::Program,
        index: u32,
        name: &str,
    ) {
        unsafe { HasContext::bind_attrib_location(self, program, index, name) }
    }

    fn link_program(&self, program: Self::Program) {
        unsafe { HasContext::link_program(self, program) }
    }

    fn get_program_link_status(&self, program: Self::Program) -> bool {
        unsafe { HasContext::get_program_link_status(self, program) }
    }

    fn get_program_info_log(&self, program: Self::Program) -> String {
        unsafe { HasContext::get_program_info_log(self, program) }
    }

    fn use_program(&self, program: Option<Self::Program>) {
        unsafe { HasContext::use_program(self, program) }
    }

    fn delete_program(&self, program: Self::Program) {
        unsafe { HasContext::delete_program(self, program) }
    }

    fn get_attrib_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<u32> {
        unsafe { HasContext::get_attrib_location(self, program, name) }
    }

    fn get_uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation> {
        unsafe { HasContext::get_uniform_location(self, program, name) }
    }

    fn set_uniform(
        &self,
        location: &Self::UniformLocation,
        value: &Uniform<'_>,
    ) {
        let location = Some(location);

        unsafe {
            match *value {
                Uniform::Int1(x) => {
                    self.uniform_1_i32(location, x);
                },
                Uniform::Int2(x, y) => {
                    self.uniform_2_i32(location, x, y);
                },
                Uniform::Int3(x, y, z) => {
                    self.uniform_3_i32(location, x, y, z);
                },
                Uniform::Int4(x, y, z, w) => {
                    self.uniform_4_i32(location, x, y, z, w);
                },
                Uniform::Float1(x) => {
                    self.uniform_1_f32(location, x);
                },
                Uniform::Float2(x, y) => {
                    self.uniform_2_f32(location, x, y);
                },
                Uniform::Float3(x, y, z) => {
                    self.uniform_3_f32(location, x, y, z);
                },
                Uniform::Float4(x, y, z, w) => {
                    self.uniform_4_f32(location, x, y, z, w);
                },
                Uniform::Int1v(v) => self.uniform_1_i32_slice(location, v),
                Uniform::Int2v(v) => self.uniform_2_i32_slice(location, v),
                Uniform::Int3v(v) => self.uniform_3_i32_slice(location, v),
                Uniform::Int4v(v) => self.uniform_4_i32_slice(location, v),
                Uniform::Float1v(v) => self.uniform_1_f32_slice(location, v),
                Uniform::Float2v(v) => self.uniform_2_f32_slice(location, v),
                Uniform::Float3v(v) => self.uniform_3_f32_slice(location, v),
                Uniform::Float4v(v) => self.uniform_4_f32_slice(location, v),
                Uniform::Matrix2(v) => {
                    self.uniform_matrix_2_f32_slice(location, false, v);
                },
                Uniform::Matrix3(v) => {
                    self.uniform_matrix_3_f32_slice(location, false, v);
                },
                Uniform::Matrix4(v) => {
                    self.uniform_matrix_4_f32_slice(location, false, v);
                },
            }
        }
    }

    fn create_buffer(&self) -> Result<Self::Buffer, String> {
        unsafe { HasContext::create_buffer(self) }
    }

    fn bind_buffer(&self, target: u32, buffer: Option<Self::Buffer>) {
        unsafe { HasContext::bind_buffer(self, target, buffer) }
    }

    fn buffer_data_u8_slice(&self, target: u32, data: &[u8], usage: u32) {
        unsafe { HasContext::buffer_data_u8_slice(self, target, data, usage) }
    }

    fn delete_buffer(&self, buffer: Self::Buffer) {
        unsafe { HasContext::delete_buffer(self, buffer) }
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        unsafe { HasContext::enable_vertex_attrib_array(self, index) }
    }

    fn vertex_attrib_pointer_f32(
        &self,
        index: u32,
        size: i32,
        data_type: u32,
        normalized: bool,
        stride: i32,
        offset: i32,
    ) {
        unsafe {
            HasContext::vertex_attrib_pointer_f32(
                self,
                index,
                size,
                data_type,
                normalized,
                stride,
                offset,
            );
        }
    }

    fn draw_arrays(&self, mode: u32, first: i32, count: i32) {
        unsafe { HasContext::draw_arrays(self, mode, first, count) }
    }

    fn draw_elements(
        &self,
        mode: u32,
        count: i32,
        element_type: u32,
        offset: i32,
    ) {
        unsafe {
            HasContext::draw_elements(self, mode, count, element_type, offset);
        }
    }

    fn create_texture(&self) -> Result<Self::Texture, String> {
        unsafe { HasContext::create_texture(self) }
    }

    fn active_texture(&self, unit: u32) {
        unsafe { HasContext::active_texture(self, unit) }
    }

    fn bind_texture(&self, target: u32, texture: Option<Self::Texture>) {
        unsafe { HasContext::bind_texture(self, target, texture) }
    }

    fn tex_image_2d(
        &self,
        target: u32,
        level: i32,
        internal_format: i32,
        width: i32,
        height: i32,
        border: i32,
        format: u32,
        ty: u32,
        pixels: Option<&[u8]>,
    ) {
        unsafe {
            HasContext::tex_image_2d(
                self,
                target,
                level,
                internal_format,
                width,
                height,
                border,
                format,
                ty,
                pixels,
            );
        }
    }

    fn tex_parameter_i32(&self, target: u32, parameter: u32, value: i32) {
        unsafe { HasContext::tex_parameter_i32(self, target, parameter, value) }
    }

    fn generate_mipmap(&self, target: u32) {
        unsafe { HasContext::generate_mipmap(self, target) }
    }

    fn delete_texture(&self, texture: Self::Texture) {
        unsafe { HasContext::delete_texture(self, texture) }
    }

    fn create_framebuffer(&self) -> Result<Self::Framebuffer, String> {
        unsafe { HasContext::create_framebuffer(self) }
    }

    fn bind_framebuffer(
        &self,
        target: u32,
        framebuffer: Option<Self::Framebuffer>,
    ) {
        unsafe { HasContext::bind_framebuffer(self, target, framebuffer) }
    }

    fn framebuffer_texture_2d(
        &self,
        target: u32,
        attachment: u32,
        texture_target: u32,
        texture: Option<Self::Texture>,
        level: i32,
    ) {
        unsafe {
            HasContext::framebuffer_texture_2d(
                self,
                target,
                attachment,
                texture_target,
                texture,
                level,
            );
        }
    }

    fn framebuffer_renderbuffer(
        &self,
        target: u32,
        attachment: u32,
        renderbuffer_target: u32,
        renderbuffer: Option<Self::Renderbuffer>,
    ) {
        unsafe {
            HasContext::framebuffer_renderbuffer(
                self,
                target,
                attachment,
                renderbuffer_target,
                renderbuffer,
            );
        }
    }

    fn check_framebuffer_status(&self, target: u32) -> u32 {
        unsafe { HasContext::check_framebuffer_status(self, target) }
    }

    fn delete_framebuffer(&self, framebuffer: Self::Framebuffer) {
        unsafe { HasContext::delete_framebuffer(self, framebuffer) }
    }

    fn create_renderbuffer(&self) -> Result<Self::Renderbuffer, String> {
        unsafe { HasContext::create_renderbuffer(self) }
    }

    fn bind_renderbuffer(
        &self,
        target: u32,
        renderbuffer: Option<Self::Renderbuffer>,
    ) {
        unsafe { HasContext::bind_renderbuffer(self, target, renderbuffer) }
    }

    fn renderbuffer_storage(
        &self,
        target: u32,
        internal_format: u32,
        width: i32,
        height: i32,
    ) {
        unsafe {
            HasContext::renderbuffer_storage(
                self,
                target,
                internal_format,
                width,
                height,
            );
        }
    }

    fn delete_renderbuffer(&self, renderbuffer: Self::Renderbuffer) {
        unsafe { HasContext::delete_renderbuffer(self, renderbuffer) }
    }

    fn clear_color(&self, red: f32, green: f32, blue: f32, alpha: f32) {
        unsafe { HasContext::clear_color(self, red, green, blue, alpha) }
    }

    fn clear_depth(&self, depth: f32) {
        unsafe { HasContext::clear_depth_f32(self, depth) }
    }

    fn clear(&self, mask: u32) {
        unsafe { HasContext::clear(self, mask) }
    }

    fn flush(&self) {
        unsafe { HasContext::flush(self) }
    }
}

/// One binding slot of the context together with the object that
/// should occupy it.
pub enum Binding<B: Backend> {
    ArrayBuffer(Option<B::Buffer>),
    ElementArrayBuffer(Option<B::Buffer>),
    Texture2d(Option<B::Texture>),
    Framebuffer(Option<B::Framebuffer>),
    Renderbuffer(Option<B::Renderbuffer>),
    Program(Option<B::Program>),
}

impl<B: Backend> fmt::Debug for Binding<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::ArrayBuffer(b) => write!(f, "ArrayBuffer({:?})", b),
            Binding::ElementArrayBuffer(b) => {
                write!(f, "ElementArrayBuffer({:?})", b)
            },
            Binding::Texture2d(t) => write!(f, "Texture2d({:?})", t),
            Binding::Framebuffer(fb) => write!(f, "Framebuffer({:?})", fb),
            Binding::Renderbuffer(rb) => write!(f, "Renderbuffer({:?})", rb),
            Binding::Program(p) => write!(f, "Program({:?})", p),
        }
    }
}

/// A backend plus the bindings that the handles have made on it.
///
/// Every bind made through the handles goes through here so the
/// shadow state always matches the native state, as long as nobody
/// binds objects by calling the backend directly.
pub struct Context<B: Backend> {
    backend: B,
    array_buffer: Cell<Option<B::Buffer>>,
    element_array_buffer: Cell<Option<B::Buffer>>,
    framebuffer: Cell<Option<B::Framebuffer>>,
    renderbuffer: Cell<Option<B::Renderbuffer>>,
    program: Cell<Option<B::Program>>,
    active_texture: Cell<u32>,
    textures: RefCell<HashMap<u32, B::Texture>>,
}

impl<B: Backend> Context<B> {
    pub fn new(backend: B) -> Context<B> {
        Context {
            backend,
            array_buffer: Cell::new(None),
            element_array_buffer: Cell::new(None),
            framebuffer: Cell::new(None),
            renderbuffer: Cell::new(None),
            program: Cell::new(None),
            active_texture: Cell::new(0),
            textures: RefCell::new(HashMap::new()),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Texture unit selected with [`Context::set_active_texture`],
    /// counted from zero.
    pub fn active_texture(&self) -> u32 {
        self.active_texture.get()
    }

    pub fn set_active_texture(&self, unit: u32) {
        if self.active_texture.replace(unit) != unit {
            self.backend.active_texture(glow::TEXTURE0 + unit);
        }
    }

    /// Returns what currently occupies the same slot as `binding`.
    pub fn current(&self, binding: &Binding<B>) -> Binding<B> {
        match binding {
            Binding::ArrayBuffer(_) => {
                Binding::ArrayBuffer(self.array_buffer.get())
            },
            Binding::ElementArrayBuffer(_) => {
                Binding::ElementArrayBuffer(self.element_array_buffer.get())
            },
            Binding::Texture2d(_) => {
                Binding::Texture2d(self.current_texture())
            },
            Binding::Framebuffer(_) => {
                Binding::Framebuffer(self.framebuffer.get())
            },
            Binding::Renderbuffer(_) => {
                Binding::Renderbuffer(self.renderbuffer.get())
            },
            Binding::Program(_) => {
                Binding::Program(self.program.get())
            },
        }
    }

    /// Makes `binding` current and returns what was in the slot
    /// before. The native call is skipped when nothing changes.
    pub fn bind(&self, binding: Binding<B>) -> Binding<B> {
        let gl = &self.backend;

        match binding {
            Binding::ArrayBuffer(buffer) => {
                let previous = self.array_buffer.replace(buffer);
                if previous != buffer {
                    gl.bind_buffer(glow::ARRAY_BUFFER, buffer);
                }
                Binding::ArrayBuffer(previous)
            },
            Binding::ElementArrayBuffer(buffer) => {
                let previous = self.element_array_buffer.replace(buffer);
                if previous != buffer {
                    gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, buffer);
                }
                Binding::ElementArrayBuffer(previous)
            },
            Binding::Texture2d(texture) => {
                let unit = self.active_texture.get();
                let previous = match texture {
                    Some(texture) => {
                        self.textures.borrow_mut().insert(unit, texture)
                    },
                    None => self.textures.borrow_mut().remove(&unit),
                };
                if previous != texture {
                    gl.bind_texture(glow::TEXTURE_2D, texture);
                }
                Binding::Texture2d(previous)
            },
            Binding::Framebuffer(framebuffer) => {
                let previous = self.framebuffer.replace(framebuffer);
                if previous != framebuffer {
                    gl.bind_framebuffer(glow::FRAMEBUFFER, framebuffer);
                }
                Binding::Framebuffer(previous)
            },
            Binding::Renderbuffer(renderbuffer) => {
                let previous = self.renderbuffer.replace(renderbuffer);
                if previous != renderbuffer {
                    gl.bind_renderbuffer(glow::RENDERBUFFER, renderbuffer);
                }
                Binding::Renderbuffer(previous)
            },
            Binding::Program(program) => {
                let previous = self.program.replace(program);
                if previous != program {
                    gl.use_program(program);
                }
                Binding::Program(previous)
            },
        }
    }

    /// Binds for as long as the returned scope is alive.
    pub fn scoped(&self, binding: Binding<B>) -> BindingScope<'_, B> {
        let previous = self.bind(binding);

        BindingScope {
            context: self,
            previous: Some(previous),
        }
    }

    fn current_texture(&self) -> Option<B::Texture> {
        self.textures.borrow().get(&self.active_texture.get()).copied()
    }

    // Deleting an object that is bound leaves the slot empty.

    pub(crate) fn forget_buffer(&self, buffer: B::Buffer) {
        for slot in [&self.array_buffer, &self.element_array_buffer] {
            if slot.get() == Some(buffer) {
                slot.set(None);
            }
        }
    }

    pub(crate) fn forget_texture(&self, texture: B::Texture) {
        self.textures.borrow_mut().retain(|_, &mut bound| bound != texture);
    }

    pub(crate) fn forget_framebuffer(&self, framebuffer: B::Framebuffer) {
        if self.framebuffer.get() == Some(framebuffer) {
            self.framebuffer.set(None);
        }
    }

    pub(crate) fn forget_renderbuffer(&self, renderbuffer: B::Renderbuffer) {
        if self.renderbuffer.get() == Some(renderbuffer) {
            self.renderbuffer.set(None);
        }
    }

    pub(crate) fn forget_program(&self, program: B::Program) {
        if self.program.get() == Some(program) {
            self.program.set(None);
        }
    }
}

/// Restores the previous binding of a slot when dropped.
pub struct BindingScope<'a, B: Backend> {
    context: &'a Context<B>,
    previous: Option<Binding<B>>,
}

impl<'a, B: Backend> Drop for BindingScope<'a, B> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            log::trace!("restoring {:?}", previous);
            self.context.bind(previous);
        }
    }
}
