use iced::keyboard::{key::Named, Key};
use iced::widget::{button, center, column, container, mouse_area, opaque, row, text, Image};
use iced::widget::image::Handle;
use iced::{alignment, Alignment, Background, Color, ContentFit, Element, Length};

use super::Remote;
use crate::state::data::GalleryItem;
use crate::state::lightbox::LightboxKey;
use crate::Message;

/// Map a pressed key to a lightbox action
pub fn key_signal(key: &Key) -> Option<LightboxKey> {
    match key {
        Key::Named(Named::ArrowLeft) => Some(LightboxKey::Previous),
        Key::Named(Named::ArrowRight) => Some(LightboxKey::Next),
        Key::Named(Named::Escape) => Some(LightboxKey::Dismiss),
        _ => None,
    }
}

/// Full-size overlay for the item at `index` of `len`.
///
/// Clicking the backdrop closes it; clicks on the image itself are swallowed.
pub fn view<'a>(
    item: &'a GalleryItem,
    image: Option<&'a Remote<Handle>>,
    index: usize,
    len: usize,
) -> Element<'a, Message> {
    let picture: Element<'a, Message> = match image {
        Some(Remote::Ready(handle)) => Image::new(handle.clone())
            .content_fit(ContentFit::Contain)
            .width(Length::Fill)
            .height(Length::Fill)
            .into(),
        Some(Remote::Failed(err)) => center(text(format!("Could not load image: {err}")).size(16)).into(),
        Some(Remote::Loading) => center(text("Loading…").size(16)).into(),
        None => center(text("No image available").size(16)).into(),
    };

    let controls = row![
        button(text("‹").size(28))
            .on_press(Message::PreviousImage)
            .style(button::text),
        text(format!("{} / {}  {}", index + 1, len, item.alt_text))
            .size(14)
            .width(Length::Fill)
            .align_x(alignment::Horizontal::Center),
        button(text("›").size(28))
            .on_press(Message::NextImage)
            .style(button::text),
        button(text("✕").size(20))
            .on_press(Message::CloseLightbox)
            .style(button::text),
    ]
    .spacing(12)
    .align_y(Alignment::Center);

    let content = container(column![picture, controls].spacing(12))
        .max_width(1400.0)
        .max_height(1000.0)
        .padding(16);

    let backdrop = container(center(opaque(content)))
        .width(Length::Fill)
        .height(Length::Fill)
        .style(|_theme| container::Style {
            background: Some(Background::Color(Color {
                a: 0.85,
                ..Color::BLACK
            })),
            ..Default::default()
        });

    opaque(mouse_area(backdrop).on_press(Message::CloseLightbox))
}
