use super::PipelineError;
use gstreamer as gst;
use gstreamer::prelude::*;
use inflow_types::PropertyValue;
use tracing::debug;

/// Set a property on an element, mapping the untyped [`PropertyValue`] onto
/// the concrete GObject property type.
///
/// Unknown property names are an error; silently ignoring them would hide
/// typos in pipeline descriptions.
pub(super) fn apply_property(
    element: &gst::Element,
    element_id: &str,
    prop_name: &str,
    prop_value: &PropertyValue,
) -> Result<(), PipelineError> {
    debug!(
        "Setting property: {}.{} = {:?}",
        element_id, prop_name, prop_value
    );

    let pspec = element.find_property(prop_name).ok_or_else(|| {
        PipelineError::InvalidProperty {
            element: element_id.to_string(),
            property: prop_name.to_string(),
            reason: "no such property".to_string(),
        }
    })?;
    let type_name = pspec.value_type().name();

    let invalid = |reason: String| PipelineError::InvalidProperty {
        element: element_id.to_string(),
        property: prop_name.to_string(),
        reason,
    };

    match prop_value {
        PropertyValue::String(v) => {
            element.set_property_from_str(prop_name, v);
        }
        PropertyValue::Int(v) => {
            if type_name == "gint" || type_name == "glong" {
                let v32 = i32::try_from(*v)
                    .map_err(|_| invalid(format!("value {} does not fit in i32", v)))?;
                element.set_property(prop_name, v32);
            } else if type_name == "guint" || type_name == "gulong" {
                let v32 = u32::try_from(*v)
                    .map_err(|_| invalid(format!("value {} does not fit in u32", v)))?;
                element.set_property(prop_name, v32);
            } else if type_name == "guint64" {
                let v64 = u64::try_from(*v)
                    .map_err(|_| invalid(format!("value {} is negative", v)))?;
                element.set_property(prop_name, v64);
            } else if type_name == "gint64" {
                element.set_property(prop_name, *v);
            } else {
                // Enums and anything else go through the string transform
                element.set_property_from_str(prop_name, &v.to_string());
            }
        }
        PropertyValue::UInt(v) => {
            if type_name == "guint" || type_name == "gulong" {
                let v32 = u32::try_from(*v)
                    .map_err(|_| invalid(format!("value {} does not fit in u32", v)))?;
                element.set_property(prop_name, v32);
            } else if type_name == "gint" || type_name == "glong" {
                let v32 = i32::try_from(*v)
                    .map_err(|_| invalid(format!("value {} does not fit in i32", v)))?;
                element.set_property(prop_name, v32);
            } else if type_name == "gint64" {
                let v64 = i64::try_from(*v)
                    .map_err(|_| invalid(format!("value {} does not fit in i64", v)))?;
                element.set_property(prop_name, v64);
            } else if type_name == "guint64" {
                element.set_property(prop_name, *v);
            } else {
                element.set_property_from_str(prop_name, &v.to_string());
            }
        }
        PropertyValue::Float(v) => {
            if type_name == "gfloat" {
                element.set_property(prop_name, *v as f32);
            } else if type_name == "gdouble" {
                element.set_property(prop_name, *v);
            } else {
                element.set_property_from_str(prop_name, &v.to_string());
            }
        }
        PropertyValue::Bool(v) => {
            if type_name == "gboolean" {
                element.set_property(prop_name, *v);
            } else {
                return Err(invalid(format!(
                    "boolean value for non-boolean property of type {}",
                    type_name
                )));
            }
        }
    }

    Ok(())
}
