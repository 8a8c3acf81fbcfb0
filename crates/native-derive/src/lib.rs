use proc_macro::TokenStream;

extern crate proc_macro;

mod native;

/// Registers a fixed-arity builtin: `#[native(+)] fn add(ctx, span, l, r)`
/// becomes `fn add() -> (SmolStr, Val)` yielding the name and the callable.
#[proc_macro_attribute]
pub fn native(attr: TokenStream, item: TokenStream) -> TokenStream {
    let attr = attr.to_string();
    native::native(attr, item).into()
}
