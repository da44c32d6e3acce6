use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    parse::Parse, parse::ParseStream, parse_macro_input, Attribute, ItemStruct, Path, Token,
};

struct ModuleItem {
    attrs: Vec<Attribute>,
    path: Path,
}

impl Parse for ModuleItem {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let attrs = input.call(Attribute::parse_outer)?;
        let path = input.parse()?;
        Ok(ModuleItem { attrs, path })
    }
}

struct ModuleArgs {
    imports: Vec<ModuleItem>,
    providers: Vec<ModuleItem>,
    features: Vec<ModuleItem>,
}

impl Parse for ModuleArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut imports = Vec::new();
        let mut providers = Vec::new();
        let mut features = Vec::new();

        while !input.is_empty() {
            let name: syn::Ident = input.parse()?;
            input.parse::<Token![=]>()?;

            // Parse array: [Item1, Item2, ...]
            let content;
            syn::bracketed!(content in input);
            let items = content.parse_terminated(ModuleItem::parse, Token![,])?;

            if name == "imports" {
                imports.extend(items);
            } else if name == "providers" {
                providers.extend(items);
            } else if name == "features" {
                features.extend(items);
            } else {
                return Err(syn::Error::new(
                    name.span(),
                    "expected `imports`, `providers` or `features`",
                ));
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(ModuleArgs {
            imports,
            providers,
            features,
        })
    }
}

pub fn module_attribute(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as ModuleArgs);
    let input = parse_macro_input!(item as ItemStruct);
    let expanded = generate_module_impl(&args, &input);

    TokenStream::from(expanded)
}

fn generate_module_impl(args: &ModuleArgs, input: &ItemStruct) -> TokenStream2 {
    let module_name = &input.ident;

    // Imported modules contribute their whole unit
    let import_units = args.imports.iter().map(|item| {
        let path = &item.path;
        let attrs = &item.attrs;
        quote! {
            #(#attrs)*
            let unit = unit.merge(<#path as ::forno::module::Module>::unit());
        }
    });

    let provider_units = args.providers.iter().map(|item| {
        let path = &item.path;
        let attrs = &item.attrs;
        quote! {
            #(#attrs)*
            let unit = unit.injectable::<#path>();
        }
    });

    let import_features = args.imports.iter().map(|item| {
        let path = &item.path;
        let attrs = &item.attrs;
        quote! {
            #(#attrs)*
            features.extend(<#path as ::forno::module::Module>::features());
        }
    });

    let feature_entries = args.features.iter().map(|item| {
        let path = &item.path;
        let attrs = &item.attrs;
        quote! {
            #(#attrs)*
            features.push(::forno::feature::FeatureEntry::of::<#path>());
        }
    });

    quote! {
        #input

        impl ::forno::module::Module for #module_name {
            fn unit() -> ::forno::di::CodeUnit {
                let unit = ::forno::di::CodeUnit::new(::core::stringify!(#module_name));
                #(#import_units)*
                #(#provider_units)*
                unit
            }

            #[allow(unused_mut)]
            fn features() -> ::std::vec::Vec<::forno::feature::FeatureEntry> {
                let mut features = ::std::vec::Vec::new();
                #(#import_features)*
                #(#feature_entries)*
                features
            }
        }

        impl #module_name {
            /// Build a container from this module's providers alone
            pub fn create_container() -> ::forno::Result<::forno::di::Container> {
                ::forno::di::ContainerBuilder::new()
                    .unit(<Self as ::forno::module::Module>::unit())
                    .build()
            }
        }
    }
}
