use iced::widget::{button, column, container, mouse_area, row, scrollable, text, Image, Space};
use iced::{Alignment, ContentFit, Element, Length};
use iced_aw::Wrap;
use std::collections::HashMap;

use super::Remote;
use crate::media::Thumbnail;
use crate::state::data::{GalleryItem, ItemId};
use crate::state::scroll::ScrollSignal;
use crate::state::session::GallerySession;
use crate::Message;

/// Width of one grid cell
pub const CELL_WIDTH: f32 = 300.0;
const SPACING: f32 = 24.0;

pub fn scroll_id() -> scrollable::Id {
    scrollable::Id::new("gallery-grid")
}

/// Normalize a scrollable viewport into the signal the fetch trigger reads
pub fn scroll_signal(viewport: scrollable::Viewport) -> ScrollSignal {
    ScrollSignal {
        offset_y: viewport.absolute_offset().y,
        viewport_height: viewport.bounds().height,
        content_height: viewport.content_bounds().height,
    }
}

/// The gallery grid with its loading and error footer
pub fn view<'a>(
    session: &'a GallerySession,
    thumbnails: &'a HashMap<String, Remote<Thumbnail>>,
    hovered: Option<&ItemId>,
) -> Element<'a, Message> {
    let cells: Vec<Element<'a, Message>> = session
        .store()
        .items()
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let thumbnail = item.image_ref.as_ref().and_then(|url| thumbnails.get(url));
            cell(index, item, thumbnail, hovered == Some(&item.id))
        })
        .collect();

    let grid = Wrap::with_elements(cells)
        .spacing(SPACING)
        .line_spacing(SPACING);

    let content = column![grid, footer(session)]
        .spacing(SPACING)
        .padding(16)
        .width(Length::Fill)
        .align_x(Alignment::Center);

    scrollable(content)
        .id(scroll_id())
        .on_scroll(|viewport| Message::GridScrolled(scroll_signal(viewport)))
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

fn cell<'a>(
    index: usize,
    item: &'a GalleryItem,
    thumbnail: Option<&'a Remote<Thumbnail>>,
    hovered: bool,
) -> Element<'a, Message> {
    let height = item.display_height(CELL_WIDTH);

    let content: Element<'a, Message> = if !item.has_image() {
        placeholder("No image available", height)
    } else {
        match thumbnail {
            Some(Remote::Ready(thumb)) => Image::new(thumb.handle(hovered).clone())
                .width(Length::Fixed(CELL_WIDTH))
                .height(Length::Fixed(height))
                .content_fit(ContentFit::Cover)
                .into(),
            Some(Remote::Failed(_)) => placeholder(&item.alt_text, height),
            _ => placeholder("", height),
        }
    };

    mouse_area(container(content).width(Length::Fixed(CELL_WIDTH)))
        .on_press(Message::OpenLightbox(index))
        .on_enter(Message::CellHovered(item.id.clone()))
        .on_exit(Message::CellUnhovered(item.id.clone()))
        .into()
}

fn placeholder<'a>(label: &str, height: f32) -> Element<'a, Message> {
    container(text(label.to_string()).size(14))
        .width(Length::Fixed(CELL_WIDTH))
        .height(Length::Fixed(height))
        .center_x(Length::Fixed(CELL_WIDTH))
        .center_y(Length::Fixed(height))
        .style(container::rounded_box)
        .into()
}

fn footer(session: &GallerySession) -> Element<'_, Message> {
    if session.is_loading() {
        return text("Loading…").size(16).into();
    }

    if let Some(err) = session.last_error() {
        return row![
            text(format!("Could not load more images: {err}")).size(14),
            button("Retry").on_press(Message::RetryPage).padding(8),
        ]
        .spacing(12)
        .align_y(Alignment::Center)
        .into();
    }

    if session.store().is_empty() && !session.cursor().has_more() {
        return text(format!("No images in {} yet.", session.filter())).size(16).into();
    }

    Space::with_height(Length::Fixed(SPACING)).into()
}
