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

use wasm_bindgen::JsCast;
use web_sys::{
    HtmlCanvasElement,
    HtmlImageElement,
    WebGlContextAttributes,
    WebGlRenderingContext,
};
use crate::error::Error;
use crate::graphics::Graphics;
use crate::texture::ImageSource;

/// Attributes requested when the WebGL context is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasOptions {
    pub alpha: bool,
    pub depth: bool,
    pub antialias: bool,
    pub premultiplied_alpha: bool,
}

impl Default for CanvasOptions {
    fn default() -> CanvasOptions {
        CanvasOptions {
            alpha: false,
            depth: true,
            antialias: true,
            premultiplied_alpha: true,
        }
    }
}

impl CanvasOptions {
    fn attributes(&self) -> WebGlContextAttributes {
        let mut attributes = WebGlContextAttributes::new();

        attributes
            .alpha(self.alpha)
            .depth(self.depth)
            .antialias(self.antialias)
            .premultiplied_alpha(self.premultiplied_alpha);

        attributes
    }
}

impl Graphics<glow::Context> {
    pub fn from_canvas(
        canvas: &HtmlCanvasElement,
        options: &CanvasOptions,
    ) -> Result<Graphics<glow::Context>, Error> {
        let Some(context) = canvas.get_context_with_context_options(
            "webgl",
            &options.attributes(),
        )
            .unwrap_or(None)
            .and_then(|c| c.dyn_into::<WebGlRenderingContext>().ok())
        else {
            return Err(Error::ContextUnavailable(
                "error getting WebGL context".to_string()
            ));
        };

        log::info!("created WebGL context with {:?}", options);

        Ok(Graphics::new(glow::Context::from_webgl1_context(context)))
    }

    /// Looks up the canvas by its id in the current document.
    pub fn from_element_id(
        id: &str,
        options: &CanvasOptions,
    ) -> Result<Graphics<glow::Context>, Error> {
        let Some(window) = web_sys::window()
        else {
            return Err(Error::ContextUnavailable(
                "failed to get window".to_string()
            ));
        };

        let Some(document) = window.document()
        else {
            return Err(Error::ContextUnavailable(
                "failed to get document".to_string()
            ));
        };

        let Some(canvas) = document.get_element_by_id(id)
            .and_then(|c| c.dyn_into::<HtmlCanvasElement>().ok())
        else {
            return Err(Error::ContextUnavailable(
                format!("failed to get canvas element “{}”", id)
            ));
        };

        Graphics::from_canvas(&canvas, options)
    }
}

impl ImageSource<glow::Context> for HtmlImageElement {
    fn size(&self) -> (u32, u32) {
        (self.natural_width(), self.natural_height())
    }

    fn upload(&self, backend: &glow::Context, target: u32) -> Result<(), Error> {
        unsafe {
            backend.tex_image_2d_with_html_image(
                target,
                0, // level
                glow::RGBA as i32,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                self,
            );
        }

        Ok(())
    }
}
