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

use std::path::Path;
use sdl2::image::LoadSurface;
use sdl2::surface::Surface;
use sdl2::pixels::PixelFormatEnum;
use crate::context::Backend;
use crate::error::Error;
use crate::graphics::Graphics;
use crate::texture::{ImageSource, Texture};

impl<'a, B: Backend> ImageSource<B> for Surface<'a> {
    fn size(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    fn upload(&self, backend: &B, target: u32) -> Result<(), Error> {
        let gl_format = match self.pixel_format_enum() {
            PixelFormatEnum::RGBA32 => glow::RGBA,
            format => {
                log::warn!("Unsupported pixel format: {:?}", format);
                return Err(Error::UnsupportedFormat(format!("{:?}", format)));
            },
        };

        let width = self.width() as usize;
        let height = self.height() as usize;
        let row_stride = self.pitch() as usize;

        if row_stride != width * 4 {
            return Err(Error::UnsupportedFormat(
                format!("row stride {} for width {}", row_stride, width)
            ));
        }

        self.with_lock(|pixels| {
            backend.tex_image_2d(
                target,
                0, // level
                gl_format as i32,
                width as i32,
                height as i32,
                0, // border
                gl_format,
                glow::UNSIGNED_BYTE,
                Some(&pixels[0..height * row_stride]),
            );
        });

        Ok(())
    }
}

impl<B: Backend> Graphics<B> {
    /// Decodes an image file into a new texture.
    pub fn load_texture<P: AsRef<Path>>(
        &self,
        path: P,
        generate_mipmap: bool,
    ) -> Result<Texture<B>, Error> {
        let path = path.as_ref();

        let surface = Surface::from_file(path)
            .map_err(|e| Error::Message(
                format!("{}: {}", path.display(), e)
            ))?;

        let mut texture = self.create_texture()?;

        texture.from_image(&surface, generate_mipmap)?;

        log::debug!(
            "loaded {} ({}×{})",
            path.display(),
            texture.width(),
            texture.height(),
        );

        Ok(texture)
    }
}
