//! Login Component
//!
//! Signed-out landing view with the provider sign-in action.

use leptos::prelude::*;

use crate::auth;

#[component]
pub fn Login() -> impl IntoView {
    view! {
        <div class="login">
            <header>
                <h1>"Groceries"</h1>
            </header>
            <main>
                <p>
                    <strong>"Real-time collaborative grocery lists."</strong>
                    " The easiest way to manage shopping with your partner."
                </p>
                <button class="login-btn" on:click=move |_| auth::sign_in()>
                    "Get Started with Google"
                </button>
            </main>
        </div>
    }
}
