use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::{
    parse_macro_input, parse_quote, GenericParam, ItemTrait, TraitBound, TraitBoundModifier,
    TypeParamBound,
};

/// Std traits that never act as contracts.
const MARKER_TRAITS: &[&str] = &[
    "Send", "Sync", "Sized", "Unpin", "Debug", "Display", "Clone", "Copy", "Default", "Any", "Eq",
    "PartialEq", "Hash", "Ord", "PartialOrd",
];

pub fn contract_attribute(attr: TokenStream, item: TokenStream) -> TokenStream {
    if !attr.is_empty() {
        return syn::Error::new(Span::call_site(), "#[contract] takes no arguments")
            .into_compile_error()
            .into();
    }

    let input = parse_macro_input!(item as ItemTrait);
    let contract_impl = generate_contract_impl(&input);
    let upcast_impl = generate_upcast_impl(&input);

    TokenStream::from(quote! {
        #input
        #contract_impl
        #upcast_impl
    })
}

fn generate_contract_impl(input: &ItemTrait) -> TokenStream2 {
    let trait_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    // every type parameter must be 'static for `dyn Trait<T>` to be
    let static_bounds = input.generics.params.iter().filter_map(|param| match param {
        GenericParam::Type(ty) => {
            let ident = &ty.ident;
            Some(quote!(#ident: 'static))
        }
        _ => None,
    });
    let predicates = where_clause.map(|w| {
        let predicates = w.predicates.iter();
        quote!(#(#predicates,)*)
    });

    let supertypes = contract_supertraits(input)
        .map(|path| quote!(<dyn #path as ::forno::di::Contract>::node()));

    quote! {
        impl #impl_generics ::forno::di::Contract for dyn #trait_name #ty_generics
        where
            #predicates
            #(#static_bounds,)*
        {
            fn node() -> ::forno::di::ContractNode {
                ::forno::di::ContractNode::new(
                    ::forno::di::ContractId::of::<dyn #trait_name #ty_generics>(),
                    ::std::vec![#(#supertypes),*],
                )
            }
        }
    }
}

/// `impl<__Impl: Trait> Upcast<__Impl> for dyn Trait`, chaining casters to
/// every contract supertrait.
fn generate_upcast_impl(input: &ItemTrait) -> TokenStream2 {
    let trait_name = &input.ident;
    let (_, ty_generics, where_clause) = input.generics.split_for_impl();

    let mut generics = input.generics.clone();
    generics.params.push(parse_quote!(__Impl));
    let (impl_generics, _, _) = generics.split_for_impl();

    let static_bounds = input.generics.params.iter().filter_map(|param| match param {
        GenericParam::Type(ty) => {
            let ident = &ty.ident;
            Some(quote!(#ident: 'static))
        }
        _ => None,
    });
    let predicates = where_clause.map(|w| {
        let predicates = w.predicates.iter();
        quote!(#(#predicates,)*)
    });

    let casts = contract_supertraits(input).map(|path| quote!(.cast::<dyn #path>()));

    quote! {
        impl #impl_generics ::forno::di::Upcast<__Impl> for dyn #trait_name #ty_generics
        where
            #predicates
            #(#static_bounds,)*
            __Impl: #trait_name #ty_generics + ::std::marker::Send + ::std::marker::Sync + 'static,
        {
            fn upcast(instance: ::std::sync::Arc<__Impl>) -> ::std::sync::Arc<Self> {
                instance
            }

            fn supertypes(
                builder: ::forno::di::DescriptorBuilder<__Impl>,
            ) -> ::forno::di::DescriptorBuilder<__Impl> {
                builder #(#casts)*
            }
        }
    }
}

fn contract_supertraits(input: &ItemTrait) -> impl Iterator<Item = &syn::Path> {
    input.supertraits.iter().filter_map(|bound| match bound {
        TypeParamBound::Trait(bound) if is_contract_bound(bound) => Some(&bound.path),
        _ => None,
    })
}

fn is_contract_bound(bound: &TraitBound) -> bool {
    if !matches!(bound.modifier, TraitBoundModifier::None) || bound.lifetimes.is_some() {
        return false;
    }
    bound
        .path
        .segments
        .last()
        .is_some_and(|segment| !MARKER_TRAITS.contains(&segment.ident.to_string().as_str()))
}
