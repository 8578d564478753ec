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
use crate::texture::{PixelType, Texture};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentPoint {
    Depth,
    Color0,
}

impl AttachmentPoint {
    pub fn gl(self) -> u32 {
        match self {
            AttachmentPoint::Depth => glow::DEPTH_ATTACHMENT,
            AttachmentPoint::Color0 => glow::COLOR_ATTACHMENT0,
        }
    }
}

/// Depth storage for a framebuffer.
pub struct Renderbuffer<B: Backend = glow::Context> {
    context: Rc<Context<B>>,
    id: B::Renderbuffer,
    width: u32,
    height: u32,
}

impl<B: Backend> Renderbuffer<B> {
    fn new(context: Rc<Context<B>>) -> Result<Renderbuffer<B>, Error> {
        let id = context.backend().create_renderbuffer()
            .map_err(|reason| Error::Creation {
                object: "Renderbuffer",
                reason,
            })?;

        Ok(Renderbuffer { context, id, width: 0, height: 0 })
    }

    pub fn id(&self) -> B::Renderbuffer {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bind(&self) {
        self.context.bind(Binding::Renderbuffer(Some(self.id)));
    }

    /// Reallocates the storage at the new size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;

        let _scope = self.context.scoped(
            Binding::Renderbuffer(Some(self.id))
        );

        self.context.backend().renderbuffer_storage(
            glow::RENDERBUFFER,
            glow::DEPTH_COMPONENT16,
            width as i32,
            height as i32,
        );
    }
}

impl<B: Backend> Drop for Renderbuffer<B> {
    fn drop(&mut self) {
        self.context.forget_renderbuffer(self.id);
        self.context.backend().delete_renderbuffer(self.id);
    }
}

/// Something taken out of a framebuffer with [`Framebuffer::detach`].
pub enum Attachment<B: Backend = glow::Context> {
    Texture(Texture<B>),
    Renderbuffer(Renderbuffer<B>),
}

pub struct Framebuffer<B: Backend = glow::Context> {
    context: Rc<Context<B>>,
    id: B::Framebuffer,
    width: u32,
    height: u32,
    depth: Option<Renderbuffer<B>>,
    color: Option<Texture<B>>,
}

impl<B: Backend> Framebuffer<B> {
    /// Creates the framebuffer and leaves it bound.
    pub(crate) fn new(
        context: Rc<Context<B>>,
        width: u32,
        height: u32,
    ) -> Result<Framebuffer<B>, Error> {
        let id = context.backend().create_framebuffer()
            .map_err(|reason| Error::Creation {
                object: "Framebuffer",
                reason,
            })?;

        let framebuffer = Framebuffer {
            context,
            id,
            width,
            height,
            depth: None,
            color: None,
        };

        framebuffer.bind();

        Ok(framebuffer)
    }

    pub fn id(&self) -> B::Framebuffer {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bind(&self) {
        self.context.bind(Binding::Framebuffer(Some(self.id)));
    }

    /// Goes back to rendering to the default framebuffer.
    pub fn unbind(&self) {
        self.context.bind(Binding::Framebuffer(None));
    }

    /// Adds depth storage the size of the framebuffer. Any previous
    /// depth attachment is detached and released.
    pub fn attach_depth(&mut self) -> Result<&Renderbuffer<B>, Error> {
        let mut renderbuffer = Renderbuffer::new(Rc::clone(&self.context))?;

        renderbuffer.resize(self.width, self.height);

        drop(self.detach(AttachmentPoint::Depth));

        let _scope = self.context.scoped(Binding::Framebuffer(Some(self.id)));

        self.context.backend().framebuffer_renderbuffer(
            glow::FRAMEBUFFER,
            AttachmentPoint::Depth.gl(),
            glow::RENDERBUFFER,
            Some(renderbuffer.id()),
        );

        Ok(self.depth.insert(renderbuffer))
    }

    /// Adds a color texture the size of the framebuffer. `pixel_type`
    /// defaults to unsigned bytes and `nearest` selects nearest
    /// filtering instead of linear. Any previous color attachment is
    /// detached and released.
    pub fn attach_texture(
        &mut self,
        pixel_type: Option<PixelType>,
        nearest: bool,
    ) -> Result<&Texture<B>, Error> {
        let mut texture = Texture::new(Rc::clone(&self.context))?;

        if let Some(pixel_type) = pixel_type {
            texture.set_pixel_type(pixel_type);
        }

        if nearest {
            texture.set_filter(false, false, false);
        }

        texture.from_data(self.width, self.height, None)?;

        drop(self.detach(AttachmentPoint::Color0));

        let _scope = self.context.scoped(Binding::Framebuffer(Some(self.id)));

        self.context.backend().framebuffer_texture_2d(
            glow::FRAMEBUFFER,
            AttachmentPoint::Color0.gl(),
            glow::TEXTURE_2D,
            Some(texture.id()),
            0, // level
        );

        Ok(self.color.insert(texture))
    }

    /// Takes the attachment at `point` out of the framebuffer and hands
    /// it back to the caller.
    pub fn detach(&mut self, point: AttachmentPoint) -> Option<Attachment<B>> {
        let attachment = match point {
            AttachmentPoint::Depth => {
                Attachment::Renderbuffer(self.depth.take()?)
            },
            AttachmentPoint::Color0 => {
                Attachment::Texture(self.color.take()?)
            },
        };

        let _scope = self.context.scoped(Binding::Framebuffer(Some(self.id)));
        let gl = self.context.backend();

        match attachment {
            Attachment::Texture(_) => {
                gl.framebuffer_texture_2d(
                    glow::FRAMEBUFFER,
                    point.gl(),
                    glow::TEXTURE_2D,
                    None,
                    0, // level
                );
            },
            Attachment::Renderbuffer(_) => {
                gl.framebuffer_renderbuffer(
                    glow::FRAMEBUFFER,
                    point.gl(),
                    glow::RENDERBUFFER,
                    None,
                );
            },
        }

        Some(attachment)
    }

    /// Changes the size and reallocates every attachment to match. The
    /// contents of the attachments are lost.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        self.width = width;
        self.height = height;

        if let Some(texture) = self.color.as_mut() {
            texture.from_data(width, height, None)?;
        }

        if let Some(renderbuffer) = self.depth.as_mut() {
            renderbuffer.resize(width, height);
        }

        Ok(())
    }

    pub fn depth(&self) -> Option<&Renderbuffer<B>> {
        if self.depth.is_none() {
            log::warn!("The depth framebuffer does not exist");
        }

        self.depth.as_ref()
    }

    pub fn texture(&self) -> Option<&Texture<B>> {
        if self.color.is_none() {
            log::warn!("The color texture framebuffer does not exist");
        }

        self.color.as_ref()
    }

    pub fn is_complete(&self) -> bool {
        let _scope = self.context.scoped(Binding::Framebuffer(Some(self.id)));

        self.context.backend().check_framebuffer_status(glow::FRAMEBUFFER)
            == glow::FRAMEBUFFER_COMPLETE
    }

    /// Releases the framebuffer along with its attachments.
    pub fn dispose(self) {
        drop(self);
    }
}

impl<B: Backend> Drop for Framebuffer<B> {
    fn drop(&mut self) {
        self.context.forget_framebuffer(self.id);
        self.context.backend().delete_framebuffer(self.id);
    }
}
