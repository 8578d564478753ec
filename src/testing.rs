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

//! A backend that keeps the GL state in memory and records every call
//! that changes it, so the handles can be tested without a context.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use crate::context::Backend;
use crate::program::Uniform;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CompileShader(u32),
    DeleteShader(u32),
    BindAttribLocation(u32, String),
    LinkProgram(u32),
    UseProgram(Option<u32>),
    DeleteProgram(u32),
    BindBuffer { target: u32, buffer: Option<u32> },
    DeleteBuffer(u32),
    VertexAttribPointer {
        index: u32,
        size: i32,
        data_type: u32,
        normalized: bool,
        stride: i32,
        offset: i32,
        buffer: Option<u32>,
    },
    DrawArrays { mode: u32, first: i32, count: i32 },
    DrawElements {
        mode: u32,
        count: i32,
        element_type: u32,
        offset: i32,
        buffer: Option<u32>,
    },
    ActiveTexture(u32),
    BindTexture { unit: u32, texture: Option<u32> },
    GenerateMipmap(Option<u32>),
    DeleteTexture(u32),
    BindFramebuffer(Option<u32>),
    FramebufferTexture2d { attachment: u32, texture: Option<u32> },
    FramebufferRenderbuffer { attachment: u32, renderbuffer: Option<u32> },
    DeleteFramebuffer(u32),
    BindRenderbuffer(Option<u32>),
    DeleteRenderbuffer(u32),
    ClearColor(f32, f32, f32, f32),
    ClearDepth(f32),
    Clear(u32),
    Flush,
}

/// What a framebuffer attachment point refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attached {
    Texture(u32),
    Renderbuffer(u32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextureStorage {
    pub width: u32,
    pub height: u32,
    pub ty: u32,
    pub pixels: Option<Vec<u8>>,
}

#[derive(Default)]
struct State {
    next_id: u32,
    fail_next_creation: bool,
    fail_next_link: bool,
    calls: Vec<Call>,

    shader_kinds: HashMap<u32, u32>,
    shader_sources: HashMap<u32, String>,
    compiled: HashSet<u32>,
    attached_shaders: HashMap<u32, Vec<u32>>,
    linked: HashSet<u32>,
    program: Option<u32>,
    attributes: HashMap<String, u32>,
    uniforms: HashMap<String, u32>,
    uniform_values: HashMap<u32, (&'static str, Vec<f32>)>,

    array_buffer: Option<u32>,
    element_array_buffer: Option<u32>,
    buffer_contents: HashMap<u32, (Vec<u8>, u32)>,
    enabled_attribs: HashSet<u32>,

    active_texture: u32,
    textures: HashMap<u32, u32>,
    texture_storage: HashMap<u32, TextureStorage>,
    texture_parameters: HashMap<(u32, u32), i32>,

    framebuffer: Option<u32>,
    attachments: HashMap<(u32, u32), Attached>,
    renderbuffer: Option<u32>,
    renderbuffer_storage: HashMap<u32, (u32, u32, u32)>,

    clear_color: Option<[f32; 4]>,
    clear_depth: Option<f32>,
}

impl State {
    fn create(&mut self) -> Result<u32, String> {
        if std::mem::take(&mut self.fail_next_creation) {
            return Err("out of memory".to_string());
        }

        self.next_id += 1;

        Ok(self.next_id)
    }

    fn current_texture(&self) -> Option<u32> {
        self.textures.get(&self.active_texture).copied()
    }
}

#[derive(Default)]
pub struct RecordingBackend {
    state: RefCell<State>,
}

impl RecordingBackend {
    pub fn new() -> RecordingBackend {
        RecordingBackend::default()
    }

    pub fn fail_next_creation(&self) {
        self.state.borrow_mut().fail_next_creation = true;
    }

    pub fn fail_next_link(&self) {
        self.state.borrow_mut().fail_next_link = true;
    }

    /// Makes `name` an active attribute at `location` in every program.
    pub fn add_attribute(&self, name: &str, location: u32) {
        self.state.borrow_mut().attributes.insert(name.to_string(), location);
    }

    /// Makes `name` an active uniform in every program.
    pub fn add_uniform(&self, name: &str) {
        let mut state = self.state.borrow_mut();
        let location = state.uniforms.len() as u32;
        state.uniforms.insert(name.to_string(), location);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn count<F>(&self, predicate: F) -> usize
        where F: Fn(&Call) -> bool
    {
        self.state.borrow().calls.iter().filter(|c| predicate(c)).count()
    }

    pub fn position<F>(&self, predicate: F) -> Option<usize>
        where F: Fn(&Call) -> bool
    {
        self.state.borrow().calls.iter().position(predicate)
    }

    pub fn shader_kind(&self, shader: u32) -> Option<u32> {
        self.state.borrow().shader_kinds.get(&shader).copied()
    }

    pub fn current_program(&self) -> Option<u32> {
        self.state.borrow().program
    }

    pub fn uniform_value(&self, name: &str) -> Option<(&'static str, Vec<f32>)> {
        let state = self.state.borrow();
        let location = state.uniforms.get(name)?;
        state.uniform_values.get(location).cloned()
    }

    pub fn array_buffer(&self) -> Option<u32> {
        self.state.borrow().array_buffer
    }

    pub fn element_array_buffer(&self) -> Option<u32> {
        self.state.borrow().element_array_buffer
    }

    pub fn buffer_contents(&self, buffer: u32) -> Option<Vec<u8>> {
        self.state.borrow().buffer_contents.get(&buffer)
            .map(|(data, _)| data.clone())
    }

    pub fn buffer_usage(&self, buffer: u32) -> Option<u32> {
        self.state.borrow().buffer_contents.get(&buffer)
            .map(|&(_, usage)| usage)
    }

    pub fn attrib_array_enabled(&self, index: u32) -> bool {
        self.state.borrow().enabled_attribs.contains(&index)
    }

    /// Texture bound to `unit`, counted from zero.
    pub fn texture_binding(&self, unit: u32) -> Option<u32> {
        self.state.borrow().textures.get(&unit).copied()
    }

    pub fn texture_storage(&self, texture: u32) -> Option<TextureStorage> {
        self.state.borrow().texture_storage.get(&texture).cloned()
    }

    pub fn texture_parameter(&self, texture: u32, parameter: u32) -> Option<i32> {
        self.state.borrow().texture_parameters.get(&(texture, parameter))
            .copied()
    }

    pub fn framebuffer(&self) -> Option<u32> {
        self.state.borrow().framebuffer
    }

    pub fn renderbuffer(&self) -> Option<u32> {
        self.state.borrow().renderbuffer
    }

    pub fn attachment(&self, framebuffer: u32, point: u32) -> Option<Attached> {
        self.state.borrow().attachments.get(&(framebuffer, point)).copied()
    }

    /// `(internal_format, width, height)` of a renderbuffer.
    pub fn renderbuffer_storage_of(
        &self,
        renderbuffer: u32,
    ) -> Option<(u32, u32, u32)> {
        self.state.borrow().renderbuffer_storage.get(&renderbuffer).copied()
    }

    pub fn clear_color_value(&self) -> Option<[f32; 4]> {
        self.state.borrow().clear_color
    }

    pub fn clear_depth_value(&self) -> Option<f32> {
        self.state.borrow().clear_depth
    }

    fn record(&self, call: Call) {
        self.state.borrow_mut().calls.push(call);
    }

    fn attach(&self, attachment: u32, attached: Option<Attached>) {
        let mut state = self.state.borrow_mut();

        let Some(framebuffer) = state.framebuffer
        else {
            panic!("attaching to the default framebuffer");
        };

        match attached {
            Some(attached) => {
                state.attachments.insert((framebuffer, attachment), attached);
            },
            None => {
                state.attachments.remove(&(framebuffer, attachment));
            },
        }
    }
}

fn uniform_values(value: &Uniform<'_>) -> Vec<f32> {
    match *value {
        Uniform::Int1(x) => vec![x as f32],
        Uniform::Int2(x, y) => vec![x as f32, y as f32],
        Uniform::Int3(x, y, z) => vec![x as f32, y as f32, z as f32],
        Uniform::Int4(x, y, z, w) => {
            vec![x as f32, y as f32, z as f32, w as f32]
        },
        Uniform::Float1(x) => vec![x],
        Uniform::Float2(x, y) => vec![x, y],
        Uniform::Float3(x, y, z) => vec![x, y, z],
        Uniform::Float4(x, y, z, w) => vec![x, y, z, w],
        Uniform::Int1v(v) |
        Uniform::Int2v(v) |
        Uniform::Int3v(v) |
        Uniform::Int4v(v) => v.iter().map(|&x| x as f32).collect(),
        Uniform::Float1v(v) |
        Uniform::Float2v(v) |
        Uniform::Float3v(v) |
        Uniform::Float4v(v) |
        Uniform::Matrix2(v) |
        Uniform::Matrix3(v) |
        Uniform::Matrix4(v) => v.to_vec(),
    }
}

impl Backend for RecordingBackend {
    type Shader = u32;
    type Program = u32;
    type Buffer = u32;
    type Texture = u32;
    type Framebuffer = u32;
    type Renderbuffer = u32;
    type UniformLocation = u32;

    fn create_shader(&self, shader_type: u32) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        let shader = state.create()?;
        state.shader_kinds.insert(shader, shader_type);
        Ok(shader)
    }

    fn shader_source(&self, shader: u32, source: &str) {
        self.state.borrow_mut().shader_sources
            .insert(shader, source.to_string());
    }

    fn compile_shader(&self, shader: u32) {
        let mut state = self.state.borrow_mut();

        let ok = state.shader_sources.get(&shader)
            .map(|source| !source.contains("error"))
            .unwrap_or(false);

        if ok {
            state.compiled.insert(shader);
        } else {
            state.compiled.remove(&shader);
        }

        state.calls.push(Call::CompileShader(shader));
    }

    fn get_shader_compile_status(&self, shader: u32) -> bool {
        self.state.borrow().compiled.contains(&shader)
    }

    fn get_shader_info_log(&self, shader: u32) -> String {
        let state = self.state.borrow();

        if state.compiled.contains(&shader) {
            String::new()
        } else {
            format!(
                "ERROR: 0:1: {}",
                state.shader_sources.get(&shader).map_or("", String::as_str),
            )
        }
    }

    fn delete_shader(&self, shader: u32) {
        self.record(Call::DeleteShader(shader));
    }

    fn create_program(&self) -> Result<u32, String> {
        self.state.borrow_mut().create()
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        self.state.borrow_mut().attached_shaders
            .entry(program)
            .or_default()
            .push(shader);
    }

    fn bind_attrib_location(&self, _program: u32, index: u32, name: &str) {
        self.record(Call::BindAttribLocation(index, name.to_string()));
    }

    fn link_program(&self, program: u32) {
        let mut state = self.state.borrow_mut();

        let shaders_ok = state.attached_shaders.get(&program)
            .map(|shaders| {
                shaders.len() == 2
                    && shaders.iter().all(|s| state.compiled.contains(s))
            })
            .unwrap_or(false);

        if shaders_ok && !std::mem::take(&mut state.fail_next_link) {
            state.linked.insert(program);
        } else {
            state.linked.remove(&program);
        }

        state.calls.push(Call::LinkProgram(program));
    }

    fn get_program_link_status(&self, program: u32) -> bool {
        self.state.borrow().linked.contains(&program)
    }

    fn get_program_info_log(&self, program: u32) -> String {
        if self.get_program_link_status(program) {
            String::new()
        } else {
            "link failed".to_string()
        }
    }

    fn use_program(&self, program: Option<u32>) {
        let mut state = self.state.borrow_mut();
        state.program = program;
        state.calls.push(Call::UseProgram(program));
    }

    fn delete_program(&self, program: u32) {
        self.record(Call::DeleteProgram(program));
    }

    fn get_attrib_location(&self, _program: u32, name: &str) -> Option<u32> {
        self.state.borrow().attributes.get(name).copied()
    }

    fn get_uniform_location(&self, _program: u32, name: &str) -> Option<u32> {
        self.state.borrow().uniforms.get(name).copied()
    }

    fn set_uniform(&self, location: &u32, value: &Uniform<'_>) {
        self.state.borrow_mut().uniform_values
            .insert(*location, (value.shape(), uniform_values(value)));
    }

    fn create_buffer(&self) -> Result<u32, String> {
        self.state.borrow_mut().create()
    }

    fn bind_buffer(&self, target: u32, buffer: Option<u32>) {
        let mut state = self.state.borrow_mut();

        match target {
            glow::ARRAY_BUFFER => state.array_buffer = buffer,
            glow::ELEMENT_ARRAY_BUFFER => state.element_array_buffer = buffer,
            _ => panic!("unexpected buffer target {:#x}", target),
        }

        state.calls.push(Call::BindBuffer { target, buffer });
    }

    fn buffer_data_u8_slice(&self, target: u32, data: &[u8], usage: u32) {
        let mut state = self.state.borrow_mut();

        let bound = match target {
            glow::ARRAY_BUFFER => state.array_buffer,
            glow::ELEMENT_ARRAY_BUFFER => state.element_array_buffer,
            _ => None,
        };

        let Some(buffer) = bound
        else {
            panic!("buffer data with nothing bound to {:#x}", target);
        };

        state.buffer_contents.insert(buffer, (data.to_vec(), usage));
    }

    fn delete_buffer(&self, buffer: u32) {
        let mut state = self.state.borrow_mut();

        if state.array_buffer == Some(buffer) {
            state.array_buffer = None;
        }
        if state.element_array_buffer == Some(buffer) {
            state.element_array_buffer = None;
        }

        state.calls.push(Call::DeleteBuffer(buffer));
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        self.state.borrow_mut().enabled_attribs.insert(index);
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
        let mut state = self.state.borrow_mut();
        let buffer = state.array_buffer;

        state.calls.push(Call::VertexAttribPointer {
            index,
            size,
            data_type,
            normalized,
            stride,
            offset,
            buffer,
        });
    }

    fn draw_arrays(&self, mode: u32, first: i32, count: i32) {
        self.record(Call::DrawArrays { mode, first, count });
    }

    fn draw_elements(
        &self,
        mode: u32,
        count: i32,
        element_type: u32,
        offset: i32,
    ) {
        let mut state = self.state.borrow_mut();
        let buffer = state.element_array_buffer;

        state.calls.push(Call::DrawElements {
            mode,
            count,
            element_type,
            offset,
            buffer,
        });
    }

    fn create_texture(&self) -> Result<u32, String> {
        self.state.borrow_mut().create()
    }

    fn active_texture(&self, unit: u32) {
        let mut state = self.state.borrow_mut();
        state.active_texture = unit - glow::TEXTURE0;
        state.calls.push(Call::ActiveTexture(unit));
    }

    fn bind_texture(&self, target: u32, texture: Option<u32>) {
        assert_eq!(target, glow::TEXTURE_2D);

        let mut state = self.state.borrow_mut();
        let unit = state.active_texture;

        match texture {
            Some(texture) => {
                state.textures.insert(unit, texture);
            },
            None => {
                state.textures.remove(&unit);
            },
        }

        state.calls.push(Call::BindTexture { unit, texture });
    }

    fn tex_image_2d(
        &self,
        _target: u32,
        _level: i32,
        _internal_format: i32,
        width: i32,
        height: i32,
        _border: i32,
        _format: u32,
        ty: u32,
        pixels: Option<&[u8]>,
    ) {
        let mut state = self.state.borrow_mut();

        let Some(texture) = state.current_texture()
        else {
            panic!("texture upload with no texture bound");
        };

        state.texture_storage.insert(
            texture,
            TextureStorage {
                width: width as u32,
                height: height as u32,
                ty,
                pixels: pixels.map(<[u8]>::to_vec),
            },
        );
    }

    fn tex_parameter_i32(&self, _target: u32, parameter: u32, value: i32) {
        let mut state = self.state.borrow_mut();

        let Some(texture) = state.current_texture()
        else {
            panic!("texture parameter with no texture bound");
        };

        state.texture_parameters.insert((texture, parameter), value);
    }

    fn generate_mipmap(&self, _target: u32) {
        let mut state = self.state.borrow_mut();
        let texture = state.current_texture();
        state.calls.push(Call::GenerateMipmap(texture));
    }

    fn delete_texture(&self, texture: u32) {
        let mut state = self.state.borrow_mut();
        state.textures.retain(|_, &mut bound| bound != texture);
        state.calls.push(Call::DeleteTexture(texture));
    }

    fn create_framebuffer(&self) -> Result<u32, String> {
        self.state.borrow_mut().create()
    }

    fn bind_framebuffer(&self, _target: u32, framebuffer: Option<u32>) {
        let mut state = self.state.borrow_mut();
        state.framebuffer = framebuffer;
        state.calls.push(Call::BindFramebuffer(framebuffer));
    }

    fn framebuffer_texture_2d(
        &self,
        _target: u32,
        attachment: u32,
        _texture_target: u32,
        texture: Option<u32>,
        _level: i32,
    ) {
        self.attach(attachment, texture.map(Attached::Texture));
        self.record(Call::FramebufferTexture2d { attachment, texture });
    }

    fn framebuffer_renderbuffer(
        &self,
        _target: u32,
        attachment: u32,
        _renderbuffer_target: u32,
        renderbuffer: Option<u32>,
    ) {
        self.attach(attachment, renderbuffer.map(Attached::Renderbuffer));
        self.record(Call::FramebufferRenderbuffer { attachment, renderbuffer });
    }

    fn check_framebuffer_status(&self, _target: u32) -> u32 {
        let state = self.state.borrow();

        match state.framebuffer {
            None => glow::FRAMEBUFFER_COMPLETE,
            Some(framebuffer) => {
                let key = (framebuffer, glow::COLOR_ATTACHMENT0);

                if state.attachments.contains_key(&key) {
                    glow::FRAMEBUFFER_COMPLETE
                } else {
                    glow::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT
                }
            },
        }
    }

    fn delete_framebuffer(&self, framebuffer: u32) {
        let mut state = self.state.borrow_mut();

        if state.framebuffer == Some(framebuffer) {
            state.framebuffer = None;
        }

        state.attachments.retain(|&(fb, _), _| fb != framebuffer);
        state.calls.push(Call::DeleteFramebuffer(framebuffer));
    }

    fn create_renderbuffer(&self) -> Result<u32, String> {
        self.state.borrow_mut().create()
    }

    fn bind_renderbuffer(&self, _target: u32, renderbuffer: Option<u32>) {
        let mut state = self.state.borrow_mut();
        state.renderbuffer = renderbuffer;
        state.calls.push(Call::BindRenderbuffer(renderbuffer));
    }

    fn renderbuffer_storage(
        &self,
        _target: u32,
        internal_format: u32,
        width: i32,
        height: i32,
    ) {
        let mut state = self.state.borrow_mut();

        let Some(renderbuffer) = state.renderbuffer
        else {
            panic!("renderbuffer storage with nothing bound");
        };

        state.renderbuffer_storage.insert(
            renderbuffer,
            (internal_format, width as u32, height as u32),
        );
    }

    fn delete_renderbuffer(&self, renderbuffer: u32) {
        let mut state = self.state.borrow_mut();

        if state.renderbuffer == Some(renderbuffer) {
            state.renderbuffer = None;
        }

        state.calls.push(Call::DeleteRenderbuffer(renderbuffer));
    }

    fn clear_color(&self, red: f32, green: f32, blue: f32, alpha: f32) {
        let mut state = self.state.borrow_mut();
        state.clear_color = Some([red, green, blue, alpha]);
        state.calls.push(Call::ClearColor(red, green, blue, alpha));
    }

    fn clear_depth(&self, depth: f32) {
        let mut state = self.state.borrow_mut();
        state.clear_depth = Some(depth);
        state.calls.push(Call::ClearDepth(depth));
    }

    fn clear(&self, mask: u32) {
        self.record(Call::Clear(mask));
    }

    fn flush(&self) {
        self.record(Call::Flush);
    }
}
