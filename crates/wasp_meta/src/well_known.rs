/// Types the Translator's type-check classifier (§4.1.6) recognizes
/// structurally rather than through a class address lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WellKnownType {
    Number,
    StringType,
    Boolean,
    JsFunction,
    JsObject,
    Void,
    Unit,
    ErrorClass,
    ArrayClass,
    IDisposable,
    TypeParameter,
    /// `System.Array` used generically, or an F# function type used
    /// generically — both rejected with a diagnostic (§4.1.6).
    ArrayOrFunctionGeneric,
}
