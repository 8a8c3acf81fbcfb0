use proc_macro2::{Literal, TokenStream};
use quote::quote;
use syn::{parse2, FnArg, ItemFn};

pub fn native<S>(name: String, s: S) -> TokenStream
where
    TokenStream: From<S>,
{
    let tokens = TokenStream::from(s);
    let func: ItemFn = match parse2(tokens) {
        Ok(func) => func,
        Err(err) => return err.to_compile_error(),
    };

    let sig = func.sig;
    let ident = sig.ident.clone();

    let name = if name.is_empty() {
        format!("{}", ident)
    } else {
        name.replace(' ', "")
    };

    let mut inputs = sig.inputs.iter();
    let (Some(ctx), Some(span)) = (inputs.next(), inputs.next()) else {
        return syn::Error::new_spanned(
            &sig,
            "a native takes a context and a span before its arguments",
        )
        .to_compile_error();
    };

    let FnArg::Typed(span_arg) = span else {
        return syn::Error::new_spanned(span, "natives cannot take self").to_compile_error();
    };
    let span_pat = &span_arg.pat;

    let mut bindings = Vec::new();
    for (idx, input) in inputs.enumerate() {
        let FnArg::Typed(arg) = input else {
            return syn::Error::new_spanned(input, "natives cannot take self").to_compile_error();
        };

        let pat = &arg.pat;
        let ty = &arg.ty;
        let idx = Literal::usize_unsuffixed(idx);
        bindings.push(quote! { let #pat: #ty = &params[#idx]; });
    }

    let n = bindings.len();
    let block = func.block;

    quote! {
        fn #ident() -> (::smol_str::SmolStr, ::ast::hir::Val) {
            fn #ident(#ctx, #span, params: &[::ast::hir::Val]) -> ::ast::hir::RFunc {
                if params.len() != #n {
                    return Err(::errors::InterpretingError::ArityError(::errors::ArityError {
                        start: #span_pat.start,
                        end: #span_pat.end,
                        name: #name.into(),
                        expected: #n,
                        found: params.len(),
                    }));
                }

                #(#bindings)*

                #block
            }

            let nfunc = ::ast::hir::NativeFunction {
                name: #name.into(),
                apply: #ident,
            };

            (#name.into(), ::ast::hir::Val::NativeFunction(nfunc))
        }
    }
}
