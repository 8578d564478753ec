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
use crate::program::Program;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    /// Vertex attribute data, bound to `ARRAY_BUFFER`
    Vertex,
    /// Element indices, bound to `ELEMENT_ARRAY_BUFFER`
    Index,
}

impl BufferKind {
    pub fn target(self) -> u32 {
        match self {
            BufferKind::Vertex => glow::ARRAY_BUFFER,
            BufferKind::Index => glow::ELEMENT_ARRAY_BUFFER,
        }
    }

    fn binding<B: Backend>(self, buffer: Option<B::Buffer>) -> Binding<B> {
        match self {
            BufferKind::Vertex => Binding::ArrayBuffer(buffer),
            BufferKind::Index => Binding::ElementArrayBuffer(buffer),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Usage {
    #[default]
    Static,
    Dynamic,
    Stream,
}

impl Usage {
    pub fn gl(self) -> u32 {
        match self {
            Usage::Static => glow::STATIC_DRAW,
            Usage::Dynamic => glow::DYNAMIC_DRAW,
            Usage::Stream => glow::STREAM_DRAW,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DataType {
    Byte,
    UnsignedByte,
    Short,
    UnsignedShort,
    #[default]
    Float,
}

impl DataType {
    pub fn gl(self) -> u32 {
        match self {
            DataType::Byte => glow::BYTE,
            DataType::UnsignedByte => glow::UNSIGNED_BYTE,
            DataType::Short => glow::SHORT,
            DataType::UnsignedShort => glow::UNSIGNED_SHORT,
            DataType::Float => glow::FLOAT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IndexType {
    UnsignedByte,
    #[default]
    UnsignedShort,
    UnsignedInt,
}

impl IndexType {
    pub fn gl(self) -> u32 {
        match self {
            IndexType::UnsignedByte => glow::UNSIGNED_BYTE,
            IndexType::UnsignedShort => glow::UNSIGNED_SHORT,
            IndexType::UnsignedInt => glow::UNSIGNED_INT,
        }
    }
}

/// Types that can be stored in an index buffer.
pub trait IndexElement: bytemuck::Pod {
    const INDEX_TYPE: IndexType;
}

impl IndexElement for u8 {
    const INDEX_TYPE: IndexType = IndexType::UnsignedByte;
}

impl IndexElement for u16 {
    const INDEX_TYPE: IndexType = IndexType::UnsignedShort;
}

impl IndexElement for u32 {
    const INDEX_TYPE: IndexType = IndexType::UnsignedInt;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Points,
    Lines,
    LineLoop,
    LineStrip,
    Triangles,
    TriangleStrip,
    TriangleFan,
}

impl Primitive {
    pub fn gl(self) -> u32 {
        match self {
            Primitive::Points => glow::POINTS,
            Primitive::Lines => glow::LINES,
            Primitive::LineLoop => glow::LINE_LOOP,
            Primitive::LineStrip => glow::LINE_STRIP,
            Primitive::Triangles => glow::TRIANGLES,
            Primitive::TriangleStrip => glow::TRIANGLE_STRIP,
            Primitive::TriangleFan => glow::TRIANGLE_FAN,
        }
    }
}

/// Where one named vertex attribute lives within a buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub size: i32,
    pub data_type: DataType,
    pub normalized: bool,
    pub stride: i32,
    pub offset: i32,
}

impl Attribute {
    /// An attribute of `size` floats packed at the start of each
    /// vertex.
    pub fn new(name: &str, size: i32) -> Attribute {
        Attribute {
            name: name.to_string(),
            size,
            data_type: DataType::Float,
            normalized: false,
            stride: 0,
            offset: 0,
        }
    }

    pub fn data_type(mut self, data_type: DataType) -> Attribute {
        self.data_type = data_type;
        self
    }

    pub fn normalized(mut self, normalized: bool) -> Attribute {
        self.normalized = normalized;
        self
    }

    pub fn stride(mut self, stride: i32) -> Attribute {
        self.stride = stride;
        self
    }

    pub fn offset(mut self, offset: i32) -> Attribute {
        self.offset = offset;
        self
    }
}

pub struct Buffer<B: Backend = glow::Context> {
    context: Rc<Context<B>>,
    id: B::Buffer,
    kind: BufferKind,
    index_type: IndexType,
    usage: Usage,
    attributes: Vec<Attribute>,
}

impl<B: Backend> Buffer<B> {
    pub(crate) fn new(
        context: Rc<Context<B>>,
        kind: BufferKind,
    ) -> Result<Buffer<B>, Error> {
        let id = context.backend().create_buffer()
            .map_err(|reason| Error::Creation {
                object: match kind {
                    BufferKind::Vertex => "Array Buffer",
                    BufferKind::Index => "Index Buffer",
                },
                reason,
            })?;

        Ok(Buffer {
            context,
            id,
            kind,
            index_type: IndexType::default(),
            usage: Usage::default(),
            attributes: Vec::new(),
        })
    }

    pub fn id(&self) -> B::Buffer {
        self.id
    }

    pub fn kind(&self) -> BufferKind {
        self.kind
    }

    pub fn index_type(&self) -> IndexType {
        self.index_type
    }

    /// Sets the type of the indices used by [`Buffer::draw`]. This only
    /// matters for index buffers.
    pub fn set_index_type(&mut self, index_type: IndexType) {
        self.index_type = index_type;
    }

    pub fn usage(&self) -> Usage {
        self.usage
    }

    pub fn set_usage(&mut self, usage: Usage) {
        self.usage = usage;
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Leaves the buffer bound to its target.
    pub fn bind(&self) {
        self.context.bind(self.kind.binding(Some(self.id)));
    }

    /// Replaces the whole contents of the buffer.
    pub fn data<T: bytemuck::Pod>(&self, source: &[T]) {
        let _scope = self.context.scoped(self.kind.binding(Some(self.id)));

        self.context.backend().buffer_data_u8_slice(
            self.kind.target(),
            bytemuck::cast_slice(source),
            self.usage.gl(),
        );
    }

    /// Records a tightly packed float attribute.
    pub fn attrib(&mut self, name: &str, size: i32) -> Result<(), Error> {
        self.push_attribute(Attribute::new(name, size))
    }

    pub fn push_attribute(&mut self, attribute: Attribute) -> Result<(), Error> {
        if attribute.name.is_empty() && attribute.size == 0 {
            return Err(Error::InvalidAttribute(
                "attribute needs a name and a size".to_string()
            ));
        }

        if !(1..=4).contains(&attribute.size) {
            return Err(Error::InvalidAttribute(format!(
                "{}: size must be 1, 2, 3 or 4, not {}",
                attribute.name,
                attribute.size,
            )));
        }

        if self.kind == BufferKind::Index {
            return Err(Error::InvalidAttribute(format!(
                "{}: index buffers have no vertex attributes",
                attribute.name,
            )));
        }

        self.attributes.push(attribute);

        Ok(())
    }

    /// Points every recorded attribute that `program` uses at this
    /// buffer. Attributes that the program doesn’t have are skipped so
    /// that the same buffer can feed programs that only use some of
    /// them.
    pub fn attrib_pointer(&self, program: &Program<B>) -> Result<(), Error> {
        if self.attributes.is_empty() {
            return Err(Error::NoAttributes);
        }

        let _scope = self.context.scoped(self.kind.binding(Some(self.id)));
        let gl = self.context.backend();

        for attribute in self.attributes.iter() {
            let Some(location) = program.attrib_location(&attribute.name)
            else {
                log::debug!(
                    "attribute {} is not used by the program",
                    attribute.name,
                );
                continue;
            };

            gl.enable_vertex_attrib_array(location);
            gl.vertex_attrib_pointer_f32(
                location,
                attribute.size,
                attribute.data_type.gl(),
                attribute.normalized,
                attribute.stride,
                attribute.offset,
            );
        }

        Ok(())
    }

    /// Draws `count` vertices. For an index buffer `offset` is in bytes
    /// into the buffer, otherwise it is the first vertex.
    pub fn draw(&self, mode: Primitive, count: i32, offset: i32) {
        let gl = self.context.backend();

        match self.kind {
            BufferKind::Index => {
                let _scope = self.context.scoped(
                    Binding::ElementArrayBuffer(Some(self.id))
                );
                gl.draw_elements(
                    mode.gl(),
                    count,
                    self.index_type.gl(),
                    offset,
                );
            },
            BufferKind::Vertex => {
                gl.draw_arrays(mode.gl(), offset, count);
            },
        }
    }

    pub fn draw_points(&self, count: i32, offset: i32) {
        self.draw(Primitive::Points, count, offset);
    }

    pub fn draw_lines(&self, count: i32, offset: i32) {
        self.draw(Primitive::Lines, count, offset);
    }

    pub fn draw_line_loop(&self, count: i32, offset: i32) {
        self.draw(Primitive::LineLoop, count, offset);
    }

    pub fn draw_line_strip(&self, count: i32, offset: i32) {
        self.draw(Primitive::LineStrip, count, offset);
    }

    pub fn draw_triangles(&self, count: i32, offset: i32) {
        self.draw(Primitive::Triangles, count, offset);
    }

    pub fn draw_triangle_strip(&self, count: i32, offset: i32) {
        self.draw(Primitive::TriangleStrip, count, offset);
    }

    pub fn draw_triangle_fan(&self, count: i32, offset: i32) {
        self.draw(Primitive::TriangleFan, count, offset);
    }

    pub fn dispose(self) {
        drop(self);
    }
}

impl<B: Backend> Drop for Buffer<B> {
    fn drop(&mut self) {
        self.context.forget_buffer(self.id);
        self.context.backend().delete_buffer(self.id);
    }
}
