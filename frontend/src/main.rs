#[cfg(feature = "csr")]
use invoicer_frontend::{App, Platform};
#[cfg(feature = "csr")]
use leptos::prelude::*;

// Use lol_alloc as the global allocator for smaller WASM size
#[cfg(all(feature = "csr", target_arch = "wasm32"))]
use lol_alloc::{AssumeSingleThreaded, FreeListAllocator};

#[cfg(all(feature = "csr", target_arch = "wasm32"))]
#[global_allocator]
static ALLOCATOR: AssumeSingleThreaded<FreeListAllocator> =
    unsafe { AssumeSingleThreaded::new(FreeListAllocator::new()) };

#[cfg(feature = "csr")]
pub fn main() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
    mount_to_body(|| view! { <App platform=Platform::browser() /> });
}

#[cfg(not(feature = "csr"))]
pub fn main() {
    eprintln!("invoicer-frontend runs in the browser; build it with `trunk serve` (feature `csr`).");
}
