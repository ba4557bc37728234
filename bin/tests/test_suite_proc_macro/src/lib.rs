use proc_macro2::Span;
use quote::quote;

/// Generates one `#[test]` per `.lox` file below the given directory (relative to `bin/tests`).
/// Each test passes the file's contents to `lox_expect`, which must be in scope at the call site.
#[proc_macro]
pub fn generate_tests(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let dir = syn::parse_macro_input!(input as syn::LitStr).value();
    let root_dir = format!("{}/../{}", env!("CARGO_MANIFEST_DIR"), dir);

    let tests = walkdir::WalkDir::new(root_dir.clone())
        .sort_by_file_name()
        .into_iter()
        .flatten()
        .filter(|entry| entry.path().extension() == Some("lox".as_ref()))
        .map(|entry| {
            let test_file_path = entry.path().to_string_lossy().to_string();
            let relative_test_path =
                entry.path().strip_prefix(&root_dir).unwrap().with_extension("").to_string_lossy().to_string();
            let name = relative_test_path
                .chars()
                .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
                .collect::<String>();
            let test_ident = syn::Ident::new(&format!("test_{name}"), Span::call_site());
            quote! {
                #[test]
                fn #test_ident() {
                    lox_expect(std::fs::read_to_string(#test_file_path).unwrap().as_str());
                }
            }
        });

    quote! {
        #[ctor::ctor]
        fn init() {
            env_logger::init();
        }

        #(#tests)*
    }
    .into()
}
