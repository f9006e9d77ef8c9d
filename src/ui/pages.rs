use iced::widget::{button, column, container, row, scrollable, text, text_input, Column, Image};
use iced::{Alignment, ContentFit, Element, Length};
use iced_aw::Wrap;
use std::collections::HashMap;

use super::Remote;
use crate::media::Thumbnail;
use crate::state::contact::{ContactField, ContactForm};
use crate::state::data::{Reference, ReferenceImage};
use crate::Message;

const CONTENT_WIDTH: f32 = 760.0;
const LOGO_SIZE: f32 = 96.0;
const REFERENCE_IMAGE_WIDTH: f32 = 240.0;

fn page<'a>(content: impl Into<Element<'a, Message>>) -> Element<'a, Message> {
    scrollable(
        container(content)
            .max_width(CONTENT_WIDTH)
            .padding(24)
            .center_x(Length::Fill),
    )
    .width(Length::Fill)
    .height(Length::Fill)
    .into()
}

fn status<'a, T>(remote: Option<&Remote<T>>) -> Option<Element<'a, Message>> {
    match remote {
        None | Some(Remote::Loading) => Some(text("Loading…").size(16).into()),
        Some(Remote::Failed(err)) => Some(text(format!("Could not load this page: {err}")).size(16).into()),
        Some(Remote::Ready(_)) => None,
    }
}

pub fn about(content: Option<&Remote<String>>) -> Element<'_, Message> {
    if let Some(placeholder) = status(content) {
        return page(placeholder);
    }

    let paragraphs = content
        .and_then(Remote::ready)
        .map(|body| body.split("\n\n").collect::<Vec<_>>())
        .unwrap_or_default();

    page(
        Column::with_children(
            paragraphs
                .into_iter()
                .map(|paragraph| text(paragraph).size(17).into()),
        )
        .spacing(16),
    )
}

fn thumbnail_cell<'a>(
    url: Option<&str>,
    thumbnails: &'a HashMap<String, Remote<Thumbnail>>,
    width: f32,
    height: f32,
    fallback: &str,
) -> Element<'a, Message> {
    match url.and_then(|url| thumbnails.get(url)) {
        Some(Remote::Ready(thumb)) => Image::new(thumb.color.clone())
            .width(Length::Fixed(width))
            .height(Length::Fixed(height))
            .content_fit(ContentFit::Contain)
            .into(),
        _ => container(text(fallback.to_string()).size(12))
            .width(Length::Fixed(width))
            .height(Length::Fixed(height))
            .center_x(Length::Fixed(width))
            .center_y(Length::Fixed(height))
            .into(),
    }
}

/// Reference list, or the images of the opened reference
pub fn references<'a>(
    references: Option<&'a Remote<Vec<Reference>>>,
    opened: Option<&'a (usize, Remote<Vec<ReferenceImage>>)>,
    thumbnails: &'a HashMap<String, Remote<Thumbnail>>,
    dark_mode: bool,
) -> Element<'a, Message> {
    if let Some(placeholder) = status(references) {
        return page(placeholder);
    }
    let references = references.and_then(Remote::ready).map(Vec::as_slice).unwrap_or_default();

    if let Some((index, images)) = opened {
        if let Some(reference) = references.get(*index) {
            return reference_detail(reference, images, thumbnails);
        }
    }

    if references.is_empty() {
        return page(text("No references yet.").size(16));
    }

    let rows = references.iter().enumerate().map(|(index, reference)| {
        let logo = thumbnail_cell(
            reference.logo(dark_mode),
            thumbnails,
            LOGO_SIZE,
            LOGO_SIZE,
            &reference.title,
        );
        let mut details = column![text(&reference.title).size(20)].spacing(6);
        if let Some(description) = &reference.description {
            details = details.push(text(description).size(14));
        }

        button(row![logo, details].spacing(20).align_y(Alignment::Center))
            .on_press(Message::ReferenceOpened(index))
            .style(button::text)
            .width(Length::Fill)
            .into()
    });

    page(Column::with_children(rows).spacing(12))
}

fn reference_detail<'a>(
    reference: &'a Reference,
    images: &'a Remote<Vec<ReferenceImage>>,
    thumbnails: &'a HashMap<String, Remote<Thumbnail>>,
) -> Element<'a, Message> {
    let header = row![
        button(text("← Back").size(14))
            .on_press(Message::ReferenceClosed)
            .style(button::secondary),
        text(&reference.title).size(24),
    ]
    .spacing(16)
    .align_y(Alignment::Center);

    let body: Element<'a, Message> = match images {
        Remote::Loading => text("Loading…").size(16).into(),
        Remote::Failed(_) => text("No images available").size(16).into(),
        Remote::Ready(images) if images.is_empty() => text("No images available").size(16).into(),
        Remote::Ready(images) => Wrap::with_elements(
            images
                .iter()
                .map(|image| {
                    thumbnail_cell(
                        image.url.as_deref(),
                        thumbnails,
                        REFERENCE_IMAGE_WIDTH,
                        REFERENCE_IMAGE_WIDTH,
                        &image.alt,
                    )
                })
                .collect(),
        )
        .spacing(12.0)
        .line_spacing(12.0)
        .into(),
    };

    let mut content = column![header].spacing(20);
    if let Some(description) = &reference.description {
        content = content.push(text(description).size(15));
    }
    page(content.push(body))
}

pub fn contact(form: &ContactForm) -> Element<'_, Message> {
    let feedback: Element<'_, Message> = match form.status() {
        Some(Ok(())) => text("Thank you, your message has been sent.").size(14).into(),
        Some(Err(err)) => text(err.to_string()).size(14).into(),
        None => text("").into(),
    };

    page(
        column![
            text("Contact").size(28),
            text_input("Name", &form.name)
                .on_input(|value| Message::ContactChanged(ContactField::Name, value))
                .padding(10),
            text_input("Email", &form.email)
                .on_input(|value| Message::ContactChanged(ContactField::Email, value))
                .padding(10),
            text_input("Message", &form.message)
                .on_input(|value| Message::ContactChanged(ContactField::Message, value))
                .on_submit(Message::ContactSubmitted)
                .padding(10),
            row![
                button("Send").on_press(Message::ContactSubmitted).padding([8, 20]),
                feedback,
            ]
            .spacing(16)
            .align_y(Alignment::Center),
        ]
        .spacing(14),
    )
}
