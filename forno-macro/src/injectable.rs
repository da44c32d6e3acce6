use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{quote, quote_spanned};
use syn::parse::Parse;
use syn::spanned::Spanned;
use syn::{parse_macro_input, Data, DeriveInput, Fields, LitStr, Token, Type};

pub fn derive_injectable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    generate_injectable_impl(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

#[derive(Default)]
struct InjectableArgs {
    lifetime: Option<TokenStream2>,
    contracts: Vec<Type>,
    service: Option<Type>,
}

fn parse_args(input: &DeriveInput) -> syn::Result<InjectableArgs> {
    let mut args = InjectableArgs::default();

    for attr in input.attrs.iter().filter(|a| a.path().is_ident("injectable")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("lifetime") {
                let value: LitStr = meta.value()?.parse()?;
                let variant = match value.value().to_ascii_lowercase().as_str() {
                    "transient" => quote!(Transient),
                    "scoped" => quote!(Scoped),
                    "singleton" => quote!(Singleton),
                    other => {
                        return Err(syn::Error::new(
                            value.span(),
                            format!(
                                "unknown lifetime `{other}`, expected transient, scoped or singleton"
                            ),
                        ))
                    }
                };
                args.lifetime = Some(quote!(::forno::di::Lifetime::#variant));
                Ok(())
            } else if meta.path.is_ident("contracts") {
                let content;
                syn::parenthesized!(content in meta.input);
                let types = content.parse_terminated(Type::parse, Token![,])?;
                args.contracts.extend(types);
                Ok(())
            } else if meta.path.is_ident("service") {
                args.service = Some(meta.value()?.parse()?);
                Ok(())
            } else {
                Err(meta.error("expected `lifetime`, `contracts` or `service`"))
            }
        })?;
    }

    Ok(args)
}

fn generate_injectable_impl(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let args = parse_args(input)?;

    let fields = match &input.data {
        Data::Struct(data) => &data.fields,
        _ => {
            return Err(syn::Error::new(
                input.span(),
                "#[derive(Injectable)] can only be applied to structs",
            ))
        }
    };

    let construct = match fields {
        Fields::Named(named) => {
            let values = named.named.iter().map(|field| {
                let field_name = &field.ident;
                let value = field_value(&field.ty);
                quote!(#field_name: #value)
            });
            quote!(Self { #(#values),* })
        }
        Fields::Unnamed(unnamed) => {
            let values = unnamed.unnamed.iter().map(|field| field_value(&field.ty));
            quote!(Self(#(#values),*))
        }
        Fields::Unit => quote!(Self),
    };

    let lifetime = args.lifetime.map(|lifetime| quote!(.lifetime(#lifetime)));
    let implements = args.contracts.iter().map(|contract| {
        quote_spanned! {contract.span()=>
            .implements::<#contract>(|instance| instance as ::std::sync::Arc<#contract>)
            .inherits::<#contract>()
        }
    });
    let service = args.service.map(|service| {
        quote_spanned! {service.span()=>
            .service::<#service>(|instance| instance as ::std::sync::Arc<#service>)
        }
    });

    Ok(quote! {
        impl #impl_generics ::forno::di::Injectable for #struct_name #ty_generics #where_clause {
            fn descriptor() -> ::forno::di::ImplementationDescriptor {
                ::forno::di::ImplementationDescriptor::builder::<Self, _>(|__injector| {
                    ::core::result::Result::Ok(#construct)
                })
                #lifetime
                #(#implements)*
                #service
                .build()
            }
        }
    })
}

/// `Arc<T>` fields are resolved, everything else is defaulted.
fn field_value(ty: &Type) -> TokenStream2 {
    match extract_injectable_type(ty) {
        Some(inner) => quote_spanned! {ty.span()=> __injector.resolve::<#inner>()?},
        None => quote_spanned! {ty.span()=> ::core::default::Default::default()},
    }
}

/// Extract the inner type from Arc<T> or Arc<dyn Trait>
fn extract_injectable_type(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != "Arc" {
        return None;
    }
    match &segment.arguments {
        syn::PathArguments::AngleBracketed(args) => match args.args.first()? {
            syn::GenericArgument::Type(inner_type) => Some(inner_type),
            _ => None,
        },
        _ => None,
    }
}
