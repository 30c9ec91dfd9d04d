//! PNG export pipeline: rasterize a chart surface and deliver the file.
//!
//! Desktop rasterizes the SVG with `usvg`/`resvg` into a `tiny-skia` pixmap
//! and encodes it with the `png` crate, then writes into the platform data
//! directory. Web draws the SVG onto a canvas and triggers a blob download.

use super::ChartSurface;

/// Encode a rendered surface to PNG bytes.
pub async fn surface_to_png(surface: &ChartSurface) -> Result<Vec<u8>, String> {
    #[cfg(target_arch = "wasm32")]
    {
        png_via_canvas(surface).await
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        rasterize(surface)
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn rasterize(surface: &ChartSurface) -> Result<Vec<u8>, String> {
    let mut options = usvg::Options::default();
    options.fontdb_mut().load_system_fonts();
    let tree = usvg::Tree::from_str(&surface.svg, &options).map_err(|err| err.to_string())?;

    let mut pixmap = tiny_skia::Pixmap::new(surface.width, surface.height)
        .ok_or("Unable to allocate pixmap")?;
    resvg::render(&tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());

    encode_png(surface.width, surface.height, pixmap.data())
}

#[cfg(not(target_arch = "wasm32"))]
fn encode_png(width: u32, height: u32, rgba: &[u8]) -> Result<Vec<u8>, String> {
    let mut buffer = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut buffer, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        encoder
            .write_header()
            .map_err(|err| err.to_string())?
            .write_image_data(rgba)
            .map_err(|err| err.to_string())?;
    }
    Ok(buffer)
}

#[cfg(target_arch = "wasm32")]
async fn png_via_canvas(surface: &ChartSurface) -> Result<Vec<u8>, String> {
    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{
        Blob, BlobPropertyBag, CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement, Url,
    };

    let mut opts = BlobPropertyBag::new();
    opts.type_("image/svg+xml");
    let parts = js_sys::Array::new();
    parts.push(&JsValue::from_str(&surface.svg));
    let blob = Blob::new_with_str_sequence_and_options(&parts, &opts)
        .map_err(|_| "Unable to build SVG blob".to_string())?;
    let url = Url::create_object_url_with_blob(&blob)
        .map_err(|_| "Unable to create SVG URL".to_string())?;

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or("Document unavailable")?;

    let canvas: HtmlCanvasElement = document
        .create_element("canvas")
        .map_err(|_| "Unable to create canvas")?
        .dyn_into()
        .map_err(|_| "Canvas cast failed")?;
    canvas.set_width(surface.width);
    canvas.set_height(surface.height);

    let context: CanvasRenderingContext2d = canvas
        .get_context("2d")
        .map_err(|_| "Canvas context unavailable")?
        .ok_or("Canvas context missing")?
        .dyn_into()
        .map_err(|_| "Context cast failed")?;

    let image = HtmlImageElement::new().map_err(|_| "Unable to create image")?;
    let decode = image.decode();
    image.set_src(&url);
    JsFuture::from(decode)
        .await
        .map_err(|_| "Image decode failed")?;

    context
        .draw_image_with_html_image_element(&image, 0.0, 0.0)
        .map_err(|_| "Unable to draw image")?;

    let data_url = canvas
        .to_data_url_with_type("image/png")
        .map_err(|_| "Unable to serialise canvas")?;
    Url::revoke_object_url(&url).ok();

    let bytes = base64::decode(data_url.split(',').nth(1).ok_or("Malformed data URL")?)
        .map_err(|_| "PNG decode failed")?;

    Ok(bytes)
}

/// Deliver encoded bytes to the user. Web triggers a browser download and
/// returns `None`; desktop writes into the exports directory and returns the
/// path for the status line.
pub async fn download_bytes(
    filename: &str,
    mime: &str,
    bytes: Vec<u8>,
) -> Result<Option<String>, String> {
    #[cfg(target_arch = "wasm32")]
    {
        use wasm_bindgen::JsCast;
        use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

        let array = js_sys::Uint8Array::from(bytes.as_slice());
        let parts = js_sys::Array::new();
        parts.push(&array.buffer());

        let mut opts = BlobPropertyBag::new();
        opts.type_(mime);
        let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &opts)
            .map_err(|_| "Failed to create blob".to_string())?;
        let url = Url::create_object_url_with_blob(&blob)
            .map_err(|_| "Unable to create download".to_string())?;

        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or("Document unavailable")?;
        let anchor: HtmlAnchorElement = document
            .create_element("a")
            .map_err(|_| "Unable to create anchor")?
            .dyn_into()
            .map_err(|_| "Anchor cast failed")?;
        anchor.set_href(&url);
        anchor.set_download(filename);
        anchor.style().set_property("display", "none").ok();

        document
            .body()
            .ok_or("Missing body")?
            .append_child(&anchor)
            .ok();
        anchor.click();
        anchor.remove();
        Url::revoke_object_url(&url).ok();

        Ok(None)
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        use std::fs;
        use std::io::Write;

        let _ = mime;
        let dir = desktop_export_dir()?;
        fs::create_dir_all(&dir).map_err(|err| err.to_string())?;
        let path = dir.join(filename);
        let mut file = fs::File::create(&path).map_err(|err| err.to_string())?;
        file.write_all(&bytes).map_err(|err| err.to_string())?;
        Ok(Some(path.to_string_lossy().to_string()))
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn desktop_export_dir() -> Result<std::path::PathBuf, String> {
    let dirs = directories::ProjectDirs::from("com", "Thermoplot", "Thermoplot")
        .ok_or("Unable to determine export directory")?;
    let dir = dirs.data_dir().join("exports");
    Ok(dir)
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crate::charts::{ChartKind, ChartSpec, RenderBackend, SvgBackend};
    use time::macros::datetime;

    #[test]
    fn exported_png_has_a_valid_header_and_size() {
        let spec = ChartSpec::new(
            ChartKind::Bar,
            "t1",
            vec![
                (datetime!(2024-01-01 00:00 UTC), 10.0),
                (datetime!(2024-01-02 00:00 UTC), 12.0),
            ],
        );
        let surface = SvgBackend.render_bar(&spec);
        let bytes = rasterize(&surface).expect("rasterize");

        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
        let decoder = png::Decoder::new(&bytes[..]);
        let reader = decoder.read_info().expect("decode header");
        let info = reader.info();
        assert_eq!(info.width, surface.width);
        assert_eq!(info.height, surface.height);
        assert!(info.width > 0 && info.height > 0);
    }

    #[test]
    fn export_goes_through_the_backend_seam() {
        let spec = ChartSpec::new(
            ChartKind::Line,
            "t1",
            vec![(datetime!(2024-01-01 00:00 UTC), 21.5)],
        );
        let surface = SvgBackend.render_line(&spec);
        let bytes = futures::executor::block_on(SvgBackend.export_png(&surface)).expect("png");
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }
}
