/// Compile a regex literal once and return a `&'static Regex`.
#[macro_export]
macro_rules! regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).unwrap());
        &*RE
    }};
}

/// Build the `HashMap<String, Option<String>>` taken by
/// [`EventInstance::update`](crate::EventInstance::update). Every listed
/// field is populated; fields left out are empty after the update.
///
/// ```
/// use dee_schema::field_values;
///
/// let values = field_values! { "公司名称" => "某公司", "公告时间" => "2019-01-01" };
/// assert_eq!(values["公司名称"].as_deref(), Some("某公司"));
/// ```
#[macro_export]
macro_rules! field_values {
    ($($field:expr => $value:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut map: std::collections::HashMap<String, Option<String>> = std::collections::HashMap::new();
        $(
            map.insert(String::from($field), Some(String::from($value)));
        )*
        map
    }};
}
