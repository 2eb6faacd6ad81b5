use iced::{button, container, Background, Color, Vector};

const SURFACE: Color = Color {
    r: 0x0A as f32 / 255.0,
    g: 0x0A as f32 / 255.0,
    b: 0x0F as f32 / 255.0,
    a: 1.0,
};

const ACCENT: Color = Color {
    r: 0x7C as f32 / 255.0,
    g: 0x3A as f32 / 255.0,
    b: 0xED as f32 / 255.0,
    a: 1.0,
};

const ACCENT_HOVERED: Color = Color {
    r: 0xA7 as f32 / 255.0,
    g: 0x8B as f32 / 255.0,
    b: 0xFA as f32 / 255.0,
    a: 1.0,
};

pub struct Container;

impl container::StyleSheet for Container {
    fn style(&self) -> container::Style {
        container::Style {
            background: Some(Background::Color(SURFACE)),
            text_color: Some(Color::WHITE),
            ..container::Style::default()
        }
    }
}

pub struct Button;

impl button::StyleSheet for Button {
    fn active(&self) -> button::Style {
        button::Style {
            background: Some(Background::Color(ACCENT)),
            border_radius: 4.0,
            shadow_offset: Vector::new(0.0, 0.0),
            text_color: Color::WHITE,
            ..button::Style::default()
        }
    }

    fn hovered(&self) -> button::Style {
        button::Style {
            background: Some(Background::Color(ACCENT_HOVERED)),
            ..self.active()
        }
    }
}
