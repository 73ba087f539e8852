/// Construct a [`Value`](crate::Value) using a JSON-like syntax.
///
/// Objects preserve the order in which their keys are written.
///
/// ```rust
/// # #[macro_use] extern crate larch;
/// # fn main() {
/// let value = graphql_value!({
///     "hero": {
///         "name": "R2-D2",
///         "appearsIn": ["NEW_HOPE", "EMPIRE", "JEDI"],
///         "primaryFunction": null,
///     },
/// });
/// # drop(value);
/// # }
/// ```
#[macro_export]
macro_rules! graphql_value {
    (null) => {
        $crate::Value::Null
    };

    ([ $($arg:tt),* $(,)* ]) => {
        $crate::Value::List(vec![ $( $crate::graphql_value!($arg) ),* ])
    };

    ({ $($key:tt : $val:tt),* $(,)* }) => {
        $crate::Value::Object(
            [ $( ($key, $crate::graphql_value!($val)) ),* ]
                .into_iter()
                .collect::<$crate::Object>(),
        )
    };

    ($e:expr) => {
        $crate::Value::from($e)
    };
}
