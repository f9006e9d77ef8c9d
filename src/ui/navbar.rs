use iced::widget::{button, container, horizontal_space, row, scrollable, text, Image, Row, Space};
use iced::{Alignment, Element, Length};

use super::Remote;
use crate::media::Thumbnail;
use crate::state::data::{Category, GalleryFilter};
use crate::{Message, Page};

const LOGO_HEIGHT: f32 = 40.0;
const SITE_TITLE: &str = "Pistar";

/// Top bar: logo and title, then Home, About, one entry per category,
/// References and Contact
pub fn view<'a>(
    logo: Option<&'a Remote<Thumbnail>>,
    categories: &'a [Category],
    active_filter: &GalleryFilter,
    page: Page,
    dark_mode: bool,
) -> Element<'a, Message> {
    let logo: Element<'a, Message> = match logo {
        Some(Remote::Ready(thumb)) => Image::new(thumb.color.clone())
            .height(Length::Fixed(LOGO_HEIGHT))
            .into(),
        _ => Space::new(Length::Fixed(LOGO_HEIGHT), Length::Fixed(LOGO_HEIGHT)).into(),
    };
    let logo = button(row![logo, text(SITE_TITLE).size(22)].spacing(10).align_y(Alignment::Center))
        .on_press(Message::FilterSelected(GalleryFilter::Home))
        .style(button::text);

    let on_gallery = page == Page::Gallery;
    let filter_link = |filter: GalleryFilter| {
        let active = on_gallery && &filter == active_filter;
        link(filter.label().to_string(), active, Message::FilterSelected(filter))
    };
    let page_link = |target: Page| link(target.to_string(), page == target, Message::PageSelected(target));

    let entries = [filter_link(GalleryFilter::Home), page_link(Page::About)]
        .into_iter()
        .chain(
            categories
                .iter()
                .map(|category| filter_link(GalleryFilter::Category(category.title.clone()))),
        )
        .chain([page_link(Page::References), page_link(Page::Contact)]);

    let links = Row::with_children(entries).spacing(4);

    let theme_toggle = button(text(if dark_mode { "Light" } else { "Dark" }).size(14))
        .on_press(Message::ToggleDarkMode)
        .style(button::secondary);

    let bar = row![
        logo,
        horizontal_space().width(Length::Fixed(16.0)),
        scrollable(links).direction(scrollable::Direction::Horizontal(
            scrollable::Scrollbar::new().width(2.0).scroller_width(2.0)
        )),
        horizontal_space(),
        theme_toggle,
    ]
    .spacing(8)
    .align_y(Alignment::Center);

    container(bar)
        .padding([8, 16])
        .width(Length::Fill)
        .into()
}

fn link<'a>(label: String, active: bool, message: Message) -> Element<'a, Message> {
    button(text(label).size(16))
        .on_press(message)
        .padding([6, 10])
        .style(move |theme, status| {
            if active {
                button::primary(theme, status)
            } else {
                button::text(theme, status)
            }
        })
        .into()
}
