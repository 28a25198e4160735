//! Reference view classes: `UIView`, `UILabel`, `UIImageView`
//!
//! These stand in for the native toolkit so documents can be built and
//! inspected without one. Each class records the properties it was given.

use crate::palette::Color;

use super::{ClassBuilder, PropertyError, PropertyValue, Rect, View, ViewClass, ViewRegistry};

/// Properties shared by every reference view
#[derive(Debug, Clone, PartialEq)]
pub struct ViewBase {
    pub background_color: Option<Color>,
    pub frame: Option<Rect>,
    pub hidden: bool,
    pub alpha: f64,
    pub tag: i64,
    pub corner_radius: f64,
    pub translates_autoresizing_mask: bool,
}

impl Default for ViewBase {
    fn default() -> Self {
        Self {
            background_color: None,
            frame: None,
            hidden: false,
            alpha: 1.0,
            tag: 0,
            corner_radius: 0.0,
            translates_autoresizing_mask: true,
        }
    }
}

/// Access to the shared [`ViewBase`] of a reference view
pub trait HasBase {
    fn base(&self) -> &ViewBase;
    fn base_mut(&mut self) -> &mut ViewBase;
}

/// `UIView`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlainView {
    pub base: ViewBase,
}

/// `UILabel`
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub base: ViewBase,
    pub text: String,
    pub text_color: Option<Color>,
    pub text_alignment: TextAlignment,
    pub number_of_lines: i64,
    pub font_size: f64,
}

impl Default for Label {
    fn default() -> Self {
        Self {
            base: ViewBase::default(),
            text: String::new(),
            text_color: None,
            text_alignment: TextAlignment::Natural,
            number_of_lines: 1,
            font_size: 17.0,
        }
    }
}

/// `UIImageView`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageView {
    pub base: ViewBase,
    /// Image resource name
    pub image: Option<String>,
    pub tint_color: Option<Color>,
}

macro_rules! impl_has_base {
    ($($ty:ty),*) => {
        $(impl HasBase for $ty {
            fn base(&self) -> &ViewBase {
                &self.base
            }

            fn base_mut(&mut self) -> &mut ViewBase {
                &mut self.base
            }
        })*
    };
}

impl_has_base!(PlainView, Label, ImageView);

/// Horizontal text alignment, numbered like the platform enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlignment {
    Left = 0,
    Center = 1,
    Right = 2,
    Justified = 3,
    Natural = 4,
}

impl TextAlignment {
    /// Accepts the raw integer or a name (`"center"`)
    pub fn from_value(value: &PropertyValue) -> Result<Self, PropertyError> {
        if let Ok(n) = value.as_i64() {
            return match n {
                0 => Ok(Self::Left),
                1 => Ok(Self::Center),
                2 => Ok(Self::Right),
                3 => Ok(Self::Justified),
                4 => Ok(Self::Natural),
                other => Err(PropertyError::OutOfRange {
                    value: other.to_string(),
                    reason: "text alignment must be 0..=4".to_string(),
                }),
            };
        }
        match value.as_str()? {
            "left" => Ok(Self::Left),
            "center" => Ok(Self::Center),
            "right" => Ok(Self::Right),
            "justified" => Ok(Self::Justified),
            "natural" => Ok(Self::Natural),
            other => Err(PropertyError::OutOfRange {
                value: other.to_string(),
                reason: "expected left, center, right, justified or natural".to_string(),
            }),
        }
    }
}

fn unit_interval(value: &PropertyValue) -> Result<f64, PropertyError> {
    let n = value.as_f64()?;
    if (0.0..=1.0).contains(&n) {
        Ok(n)
    } else {
        Err(PropertyError::OutOfRange {
            value: n.to_string(),
            reason: "must be between 0 and 1".to_string(),
        })
    }
}

fn non_negative(value: &PropertyValue) -> Result<f64, PropertyError> {
    let n = value.as_f64()?;
    if n >= 0.0 {
        Ok(n)
    } else {
        Err(PropertyError::OutOfRange {
            value: n.to_string(),
            reason: "must not be negative".to_string(),
        })
    }
}

/// Register the properties every view kind shares
fn base_properties<V: View + HasBase>(builder: ClassBuilder<V>) -> ClassBuilder<V> {
    builder
        .property("backgroundColor", |v: &mut V, value| {
            v.base_mut().background_color = Some(value.as_color()?);
            Ok(())
        })
        .property("frame", |v: &mut V, value| {
            v.base_mut().frame = Some(value.as_rect()?);
            Ok(())
        })
        .property("hidden", |v: &mut V, value| {
            v.base_mut().hidden = value.as_bool()?;
            Ok(())
        })
        .property("alpha", |v: &mut V, value| {
            v.base_mut().alpha = unit_interval(value)?;
            Ok(())
        })
        .property("tag", |v: &mut V, value| {
            v.base_mut().tag = value.as_i64()?;
            Ok(())
        })
        .property("cornerRadius", |v: &mut V, value| {
            v.base_mut().corner_radius = non_negative(value)?;
            Ok(())
        })
        .property("translatesAutoresizingMaskIntoConstraints", |v: &mut V, value| {
            v.base_mut().translates_autoresizing_mask = value.as_bool()?;
            Ok(())
        })
}

impl ViewRegistry {
    /// Registry with the reference classes
    pub fn standard() -> Self {
        Self::new()
            .with_class(view_class())
            .with_class(label_class())
            .with_class(image_view_class())
    }
}

fn view_class() -> ViewClass {
    base_properties(ViewClass::builder::<PlainView>("UIView")).build()
}

fn label_class() -> ViewClass {
    base_properties(ViewClass::builder::<Label>("UILabel"))
        .property("text", |l: &mut Label, value| {
            l.text = match value {
                PropertyValue::Json(json) => {
                    let mut text = String::new();
                    crate::template::push_value_text(&mut text, json);
                    text
                }
                other => other.as_str()?.to_string(),
            };
            Ok(())
        })
        .property("textColor", |l: &mut Label, value| {
            l.text_color = Some(value.as_color()?);
            Ok(())
        })
        .property("textAlignment", |l: &mut Label, value| {
            l.text_alignment = TextAlignment::from_value(value)?;
            Ok(())
        })
        .property("numberOfLines", |l: &mut Label, value| {
            let lines = value.as_i64()?;
            if lines < 0 {
                return Err(PropertyError::OutOfRange {
                    value: lines.to_string(),
                    reason: "must not be negative".to_string(),
                });
            }
            l.number_of_lines = lines;
            Ok(())
        })
        .property("fontSize", |l: &mut Label, value| {
            l.font_size = non_negative(value)?;
            Ok(())
        })
        .build()
}

fn image_view_class() -> ViewClass {
    base_properties(ViewClass::builder::<ImageView>("UIImageView"))
        .property("image", |v: &mut ImageView, value| {
            v.image = Some(value.as_str()?.to_string());
            Ok(())
        })
        .property("tintColor", |v: &mut ImageView, value| {
            v.tint_color = Some(value.as_color()?);
            Ok(())
        })
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn apply(kind: &str, view: &mut dyn View, name: &str, value: PropertyValue) -> Result<(), PropertyError> {
        let registry = ViewRegistry::standard();
        registry
            .get(kind)
            .unwrap()
            .apply(view, name, &value)
            .unwrap_or_else(|| panic!("{} has no property {}", kind, name))
    }

    #[test]
    fn test_standard_kinds() {
        assert_eq!(
            ViewRegistry::standard().kinds(),
            vec!["UIImageView", "UILabel", "UIView"]
        );
    }

    #[test]
    fn test_label_properties() {
        let mut label = Label::default();
        apply("UILabel", &mut label, "text", PropertyValue::Text("Hi".into())).unwrap();
        apply("UILabel", &mut label, "textColor", PropertyValue::Color(Color::rgb(255, 255, 255))).unwrap();
        apply("UILabel", &mut label, "textAlignment", PropertyValue::Json(json!(1))).unwrap();
        apply("UILabel", &mut label, "numberOfLines", PropertyValue::Json(json!(0))).unwrap();

        assert_eq!(label.text, "Hi");
        assert_eq!(label.text_color, Some(Color::rgb(255, 255, 255)));
        assert_eq!(label.text_alignment, TextAlignment::Center);
        assert_eq!(label.number_of_lines, 0);
    }

    #[test]
    fn test_label_text_accepts_numbers() {
        let mut label = Label::default();
        apply("UILabel", &mut label, "text", PropertyValue::Json(json!(42))).unwrap();
        assert_eq!(label.text, "42");
    }

    #[test]
    fn test_shared_properties_on_image_view() {
        let mut image = ImageView::default();
        apply("UIImageView", &mut image, "frame", PropertyValue::Json(json!([0, 0, 10, 10]))).unwrap();
        apply("UIImageView", &mut image, "translatesAutoresizingMaskIntoConstraints", PropertyValue::Json(json!(false))).unwrap();
        apply("UIImageView", &mut image, "backgroundColor", PropertyValue::Color(Color::rgb(0, 0xcc, 0xf0))).unwrap();

        assert_eq!(image.base.frame, Some(Rect::new(0.0, 0.0, 10.0, 10.0)));
        assert!(!image.base.translates_autoresizing_mask);
        assert_eq!(image.base.background_color, Some(Color::rgb(0, 0xcc, 0xf0)));
    }

    #[test]
    fn test_type_mismatch() {
        let mut view = PlainView::default();
        let err = apply("UIView", &mut view, "backgroundColor", PropertyValue::Text("red".into())).unwrap_err();
        assert!(matches!(err, PropertyError::TypeMismatch { expected: "a color", .. }));
    }

    #[test]
    fn test_out_of_range() {
        let mut view = PlainView::default();
        assert!(matches!(
            apply("UIView", &mut view, "alpha", PropertyValue::Json(json!(1.5))),
            Err(PropertyError::OutOfRange { .. })
        ));
        assert_eq!(view.base.alpha, 1.0);
    }

    #[test]
    fn test_text_alignment_by_name() {
        assert_eq!(
            TextAlignment::from_value(&PropertyValue::Text("right".into())),
            Ok(TextAlignment::Right)
        );
        assert!(TextAlignment::from_value(&PropertyValue::Json(json!(9))).is_err());
    }

    #[test]
    fn test_label_has_no_image() {
        let registry = ViewRegistry::standard();
        assert!(!registry.get("UILabel").unwrap().has_property("image"));
        assert!(registry.get("UIImageView").unwrap().has_property("image"));
    }
}
