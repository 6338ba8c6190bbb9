extern crate proc_macro;

use crate::proc_macro::TokenStream;

use quote::quote;

use syn::{parse_macro_input, DeriveInput};

/// Marks a type as storable in `CycleState`. The type must be `Clone + Send + Sync + 'static`.
#[proc_macro_derive(StateData)]
pub fn state_data_derive(input: TokenStream) -> TokenStream {
  let input = parse_macro_input!(input as DeriveInput);
  let name = &input.ident;
  let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

  TokenStream::from(quote! {
    impl #impl_generics prefer_node_label::core::scheduler::cycle_state::StateData
      for #name #ty_generics #where_clause { }
  })
}
