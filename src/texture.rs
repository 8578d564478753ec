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

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PixelType {
    #[default]
    UnsignedByte,
    UnsignedShort4444,
    UnsignedShort5551,
    UnsignedShort565,
    Float,
}

impl PixelType {
    pub fn gl(self) -> u32 {
        match self {
            PixelType::UnsignedByte => glow::UNSIGNED_BYTE,
            PixelType::UnsignedShort4444 => glow::UNSIGNED_SHORT_4_4_4_4,
            PixelType::UnsignedShort5551 => glow::UNSIGNED_SHORT_5_5_5_1,
            PixelType::UnsignedShort565 => glow::UNSIGNED_SHORT_5_6_5,
            PixelType::Float => glow::FLOAT,
        }
    }

    /// Size of one pixel in an upload of this type.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelType::UnsignedByte => 4,
            PixelType::UnsignedShort4444 |
            PixelType::UnsignedShort5551 |
            PixelType::UnsignedShort565 => 2,
            PixelType::Float => 16,
        }
    }

    fn format(self) -> u32 {
        match self {
            PixelType::UnsignedShort565 => glow::RGB,
            _ => glow::RGBA,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Wrap {
    Repeat,
    ClampToEdge,
    MirroredRepeat,
}

impl Wrap {
    pub fn gl(self) -> u32 {
        match self {
            Wrap::Repeat => glow::REPEAT,
            Wrap::ClampToEdge => glow::CLAMP_TO_EDGE,
            Wrap::MirroredRepeat => glow::MIRRORED_REPEAT,
        }
    }
}

/// Returns the `(min, mag)` filter pair for a texture.
///
/// The GL filter constants are laid out so that bit 0 selects linear
/// sampling within a level, bit 8 selects mipmapping and bit 1 selects
/// linear blending between mipmap levels. `linear_mipmap` only has an
/// effect together with `near_mipmap`.
pub fn filter_constants(
    linear: bool,
    near_mipmap: bool,
    linear_mipmap: bool,
) -> (u32, u32) {
    let mag = glow::NEAREST | linear as u32;
    let min = mag
        | (near_mipmap as u32) << 8
        | ((near_mipmap && linear_mipmap) as u32) << 1;

    (min, mag)
}

/// Bytes needed for a `width`×`height` image, or `None` if that
/// doesn’t fit in the address space.
fn image_size(width: u32, height: u32, bytes_per_pixel: usize) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(bytes_per_pixel)
}

/// Something that can fill a texture with RGBA pixels.
pub trait ImageSource<B: Backend> {
    /// The intrinsic size of the image.
    fn size(&self) -> (u32, u32);

    /// Uploads level 0 of `target`, which is already bound.
    fn upload(&self, backend: &B, target: u32) -> Result<(), Error>;
}

/// Decoded RGBA pixels with 8 bits per component and no padding
/// between rows.
#[derive(Debug, Clone, Copy)]
pub struct RgbaImage<'a> {
    width: u32,
    height: u32,
    pixels: &'a [u8],
}

impl<'a> RgbaImage<'a> {
    pub fn new(
        width: u32,
        height: u32,
        pixels: &'a [u8],
    ) -> Result<RgbaImage<'a>, Error> {
        let expected = image_size(width, height, 4).unwrap_or(usize::MAX);

        if pixels.len() != expected {
            return Err(Error::PixelData { expected, actual: pixels.len() });
        }

        Ok(RgbaImage { width, height, pixels })
    }

    pub fn pixels(&self) -> &'a [u8] {
        self.pixels
    }
}

impl<'a, B: Backend> ImageSource<B> for RgbaImage<'a> {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn upload(&self, backend: &B, target: u32) -> Result<(), Error> {
        backend.tex_image_2d(
            target,
            0, // level
            glow::RGBA as i32,
            self.width as i32,
            self.height as i32,
            0, // border
            glow::RGBA,
            glow::UNSIGNED_BYTE,
            Some(self.pixels),
        );

        Ok(())
    }
}

pub struct Texture<B: Backend = glow::Context> {
    context: Rc<Context<B>>,
    id: B::Texture,
    width: u32,
    height: u32,
    pixel_type: PixelType,
    filter: (u32, u32),
}

impl<B: Backend> Texture<B> {
    pub(crate) fn new(context: Rc<Context<B>>) -> Result<Texture<B>, Error> {
        let id = context.backend().create_texture()
            .map_err(|reason| Error::Creation { object: "Texture", reason })?;

        Ok(Texture {
            context,
            id,
            width: 0,
            height: 0,
            pixel_type: PixelType::default(),
            filter: filter_constants(true, false, false),
        })
    }

    pub fn id(&self) -> B::Texture {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_type(&self) -> PixelType {
        self.pixel_type
    }

    /// Sets the pixel type used by the next [`Texture::from_data`].
    pub fn set_pixel_type(&mut self, pixel_type: PixelType) {
        self.pixel_type = pixel_type;
    }

    /// The `(min, mag)` filters currently applied.
    pub fn filter(&self) -> (u32, u32) {
        self.filter
    }

    /// Leaves the texture bound, optionally selecting a texture unit
    /// first.
    pub fn bind(&self, unit: Option<u32>) {
        if let Some(unit) = unit {
            self.context.set_active_texture(unit);
        }

        self.context.bind(Binding::Texture2d(Some(self.id)));
    }

    /// Uploads a decoded image and takes its size. Whether mipmaps are
    /// generated is up to the caller because it depends on the filter
    /// that is going to be used.
    pub fn from_image<S>(
        &mut self,
        source: &S,
        generate_mipmap: bool,
    ) -> Result<(), Error>
        where S: ImageSource<B> + ?Sized
    {
        let (width, height) = source.size();

        let _scope = self.context.scoped(Binding::Texture2d(Some(self.id)));
        let gl = self.context.backend();

        source.upload(gl, glow::TEXTURE_2D)?;

        self.width = width;
        self.height = height;

        self.apply_filter();

        if generate_mipmap {
            gl.generate_mipmap(glow::TEXTURE_2D);
        }

        Ok(())
    }

    /// Allocates storage of the given size with the configured pixel
    /// type and fills it with `data`. With `None` the contents are
    /// left undefined, which is what render targets want.
    pub fn from_data(
        &mut self,
        width: u32,
        height: u32,
        data: Option<&[u8]>,
    ) -> Result<(), Error> {
        if let Some(data) = data {
            let expected = image_size(
                width,
                height,
                self.pixel_type.bytes_per_pixel(),
            ).unwrap_or(usize::MAX);

            if data.len() != expected {
                return Err(Error::PixelData { expected, actual: data.len() });
            }
        }

        self.width = width;
        self.height = height;

        let _scope = self.context.scoped(Binding::Texture2d(Some(self.id)));
        let gl = self.context.backend();
        let format = self.pixel_type.format();

        gl.tex_image_2d(
            glow::TEXTURE_2D,
            0, // level
            format as i32,
            width as i32,
            height as i32,
            0, // border
            format,
            self.pixel_type.gl(),
            data,
        );

        self.apply_filter();

        Ok(())
    }

    pub fn set_filter(
        &mut self,
        linear: bool,
        near_mipmap: bool,
        linear_mipmap: bool,
    ) {
        self.filter = filter_constants(linear, near_mipmap, linear_mipmap);

        let _scope = self.context.scoped(Binding::Texture2d(Some(self.id)));

        self.apply_filter();
    }

    fn apply_filter(&self) {
        let gl = self.context.backend();
        let (min, mag) = self.filter;

        gl.tex_parameter_i32(
            glow::TEXTURE_2D,
            glow::TEXTURE_MIN_FILTER,
            min as i32,
        );
        gl.tex_parameter_i32(
            glow::TEXTURE_2D,
            glow::TEXTURE_MAG_FILTER,
            mag as i32,
        );
    }

    pub fn set_wrap(&self, wrap: Wrap) {
        let _scope = self.context.scoped(Binding::Texture2d(Some(self.id)));
        let gl = self.context.backend();

        gl.tex_parameter_i32(
            glow::TEXTURE_2D,
            glow::TEXTURE_WRAP_S,
            wrap.gl() as i32,
        );
        gl.tex_parameter_i32(
            glow::TEXTURE_2D,
            glow::TEXTURE_WRAP_T,
            wrap.gl() as i32,
        );
    }

    pub fn set_repeat_wrap(&self) {
        self.set_wrap(Wrap::Repeat);
    }

    pub fn set_clamp_wrap(&self) {
        self.set_wrap(Wrap::ClampToEdge);
    }

    pub fn set_mirror_wrap(&self) {
        self.set_wrap(Wrap::MirroredRepeat);
    }

    pub fn dispose(self) {
        drop(self);
    }
}

impl<B: Backend> Drop for Texture<B> {
    fn drop(&mut self) {
        self.context.forget_texture(self.id);
        self.context.backend().delete_texture(self.id);
    }
}
