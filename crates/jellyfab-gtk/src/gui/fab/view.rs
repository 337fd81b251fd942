use super::{GLYPH_FONT_SIZE, ICON_FILL, SHADOW_LAYERS};
use crate::gui::theme::ThemeColors;
use crate::icon::{ICON_SIZE, IconCache};
use cairo::Context;
use gdk_pixbuf::Pixbuf;
use gdk4::prelude::*;
use jellyfab::outline::BlobPath;
use jellyfab::{ButtonSprite, Glyph, HexColor, IconRef, JellyFab, Scene};
use palette::Srgba;
use std::f64::consts::PI;

enum Content<'a> {
    Icon(&'a IconRef),
    Glyph(&'static str),
}

fn glyph_text(glyph: Glyph) -> &'static str {
    match glyph {
        Glyph::Expand => "+",
        Glyph::Close => "\u{00d7}",
    }
}

fn set_source(cr: &Context, color: Srgba<f64>, alpha: f64) {
    let (r, g, b, a) = color.into_components();
    cr.set_source_rgba(r, g, b, a * alpha);
}

struct ItemRenderer<'a> {
    sprite: &'a ButtonSprite,
    content: Content<'a>,
    color: HexColor,
}

impl<'a> ItemRenderer<'a> {
    fn new(sprite: &'a ButtonSprite, content: Content<'a>, color: HexColor) -> Self {
        Self {
            sprite,
            content,
            color,
        }
    }

    fn draw(
        &self,
        cr: &Context,
        colors: &ThemeColors,
        icons: &IconCache,
    ) -> Result<(), cairo::Error> {
        if !self.sprite.visible {
            return Ok(());
        }
        self.draw_circle(cr)?;
        match self.content {
            Content::Icon(icon) => match icons.get(icon) {
                Some(pixbuf) => self.draw_icon(cr, pixbuf),
                None => self.draw_text(cr, colors, &fallback_label(icon)),
            },
            Content::Glyph(text) => self.draw_text(cr, colors, text),
        }
    }

    fn draw_circle(&self, cr: &Context) -> Result<(), cairo::Error> {
        set_source(cr, *self.color, self.sprite.alpha);
        cr.arc(
            self.sprite.center.x,
            self.sprite.center.y,
            self.sprite.radius,
            0.0,
            2.0 * PI,
        );
        cr.fill()
    }

    fn draw_icon(&self, cr: &Context, pixbuf: &Pixbuf) -> Result<(), cairo::Error> {
        // fit icon into the button
        let icon_scale = (self.sprite.radius * 2.0 * ICON_FILL) / ICON_SIZE as f64;
        let (iw, ih) = (
            pixbuf.width() as f64 * icon_scale,
            pixbuf.height() as f64 * icon_scale,
        );
        let (ix, iy) = (
            self.sprite.center.x - iw / 2.0,
            self.sprite.center.y - ih / 2.0,
        );

        cr.save()?;
        cr.translate(ix, iy);
        cr.scale(icon_scale, icon_scale);
        cr.push_group();
        cr.set_source_pixbuf(pixbuf, 0.0, 0.0);
        cr.paint()?;
        cr.pop_group_to_source()?;
        cr.paint_with_alpha(self.sprite.alpha)?;
        cr.restore()
    }

    fn draw_text(
        &self,
        cr: &Context,
        colors: &ThemeColors,
        text: &str,
    ) -> Result<(), cairo::Error> {
        set_source(cr, colors.glyph, self.sprite.alpha);
        let size = GLYPH_FONT_SIZE * self.sprite.radius / 20.0;
        draw_centered_text(cr, self.sprite.center, text, size)
    }
}

fn fallback_label(icon: &IconRef) -> String {
    icon.chars()
        .find(|c| c.is_alphanumeric())
        .map(|c| c.to_uppercase().collect::<String>())
        .unwrap_or_default()
}

fn draw_centered_text(
    cr: &Context,
    center: jellyfab::Point,
    text: &str,
    size: f64,
) -> Result<(), cairo::Error> {
    cr.select_font_face("Sans", cairo::FontSlant::Normal, cairo::FontWeight::Bold);
    cr.set_font_size(size);
    if let Ok(ext) = cr.text_extents(text) {
        cr.move_to(
            center.x - ext.width() / 2.0 - ext.x_bearing(),
            center.y - ext.height() / 2.0 - ext.y_bearing(),
        );
        cr.show_text(text)?;
    }
    Ok(())
}

fn append_blob(cr: &Context, blob: &BlobPath) {
    cr.new_path();
    cr.move_to(blob.start.x, blob.start.y);
    for seg in blob.to_cubics() {
        cr.curve_to(seg.c1.x, seg.c1.y, seg.c2.x, seg.c2.y, seg.to.x, seg.to.y);
    }
    cr.close_path();
}

/// Soft shadow approximated by stacking grown, faint copies of the blob.
fn draw_shadow(cr: &Context, scene: &Scene, colors: &ThemeColors) -> Result<(), cairo::Error> {
    let shadow = scene.shadow;
    let layer_alpha = shadow.opacity / SHADOW_LAYERS as f64;

    cr.save()?;
    cr.translate(0.0, shadow.offset_y);
    cr.set_line_join(cairo::LineJoin::Round);
    for layer in (1..=SHADOW_LAYERS).rev() {
        let grow = shadow.blur * layer as f64 / SHADOW_LAYERS as f64;
        append_blob(cr, &scene.blob);
        set_source(cr, colors.shadow, layer_alpha);
        cr.set_line_width(grow * 2.0);
        cr.fill_preserve()?;
        cr.stroke()?;
    }
    cr.restore()
}

fn draw_overlay(
    cr: &Context,
    scene: &Scene,
    colors: &ThemeColors,
    width: f64,
    height: f64,
) -> Result<(), cairo::Error> {
    if scene.overlay_alpha <= 0.0 {
        return Ok(());
    }
    set_source(cr, colors.scrim, scene.overlay_alpha);
    cr.rectangle(0.0, 0.0, width, height);
    cr.fill()
}

pub fn draw(
    cr: &Context,
    fab: &JellyFab,
    scene: &Scene,
    colors: &ThemeColors,
    icons: &IconCache,
    size: (f64, f64),
) -> Result<(), cairo::Error> {
    draw_overlay(cr, scene, colors, size.0, size.1)?;

    // secondary items unfurl behind the primary layer
    for (sprite, item) in scene.secondary.iter().zip(fab.secondary_items()) {
        ItemRenderer::new(sprite, Content::Icon(&item.icon), fab.item_color)
            .draw(cr, colors, icons)?;
    }

    for (i, (sprite, item)) in scene.primary.iter().zip(fab.primary_items()).enumerate() {
        let content = match scene.anchor_glyph {
            Some(glyph) if i == 0 => Content::Glyph(glyph_text(glyph)),
            _ => Content::Icon(&item.icon),
        };
        ItemRenderer::new(sprite, content, fab.item_color).draw(cr, colors, icons)?;
    }

    draw_shadow(cr, scene, colors)?;
    append_blob(cr, &scene.blob);
    set_source(cr, *fab.main_color, 1.0);
    cr.fill()?;

    let main_glyph = if fab.state().is_open() {
        Glyph::Close
    } else {
        Glyph::Expand
    };
    set_source(cr, colors.glyph, 1.0);
    draw_centered_text(
        cr,
        scene.main.center,
        glyph_text(main_glyph),
        GLYPH_FONT_SIZE * scene.main.radius / 20.0,
    )
}
