//! Server-side rendering of the desktop: menu bar plus every open window at
//! its current geometry and stacking order.

use crate::window_manager::{WindowInstance, WindowManager};
use maud::{html, Markup, PreEscaped, DOCTYPE};

/// Wires the rendered chrome to the `/api/windows` and `/api/pointer` routes
/// and submits the contact form as JSON.
const DESKTOP_SCRIPT: &str = r##"
const post = (url, body) =>
  fetch(url, {
    method: "POST",
    headers: { "content-type": "application/json" },
    body: JSON.stringify(body || {}),
  }).then((r) => r.json());

const restack = ({ windows }) => {
  for (const w of windows || []) {
    const el = document.getElementById("window-" + w.id);
    if (!el) continue;
    Object.assign(el.style, {
      left: w.x + "px",
      top: w.y + "px",
      width: w.width + "px",
      height: w.height + "px",
      zIndex: w.z_index,
    });
  }
};

document.addEventListener("click", (e) => {
  const open = e.target.closest("[data-open-window]");
  if (open) {
    post(`/api/windows/${open.dataset.openWindow}/open`).then(() => location.reload());
    return;
  }
  const close = e.target.closest("[data-close-window]");
  if (close) {
    post(`/api/windows/${close.dataset.closeWindow}/close`).then(() => location.reload());
  }
});

let active = null;

document.addEventListener("pointerdown", (e) => {
  const win = e.target.closest("[data-window]");
  if (!win || e.target.closest("[data-close-window]")) return;
  const handle = e.target.closest("[data-resize-handle]")
    ? "resize_grip"
    : e.target.closest("[data-drag-handle]")
      ? "title_bar"
      : null;
  if (!handle) {
    post(`/api/windows/${win.dataset.window}/focus`).then(restack);
    return;
  }
  e.preventDefault();
  active = win;
  post(`/api/windows/${win.dataset.window}/press`, { handle, x: e.clientX, y: e.clientY }).then(restack);
});

document.addEventListener("pointermove", (e) => {
  if (!active) return;
  const win = active;
  post("/api/pointer/move", { x: e.clientX, y: e.clientY }).then(({ provisional: p }) => {
    if (!p) return;
    if (p.kind === "position") {
      win.style.left = p.x + "px";
      win.style.top = p.y + "px";
    } else {
      win.style.width = p.width + "px";
      win.style.height = p.height + "px";
    }
  });
});

document.addEventListener("pointerup", (e) => {
  if (!active) return;
  active = null;
  post("/api/pointer/release", { x: e.clientX, y: e.clientY }).then(restack);
});

for (const form of document.querySelectorAll("[data-contact-form]")) {
  const status = form.querySelector("[data-form-status]");
  const button = form.querySelector("button[type=submit]");
  form.addEventListener("submit", (e) => {
    e.preventDefault();
    if (button.disabled) return;
    button.disabled = true;
    fetch(form.action, {
      method: "POST",
      headers: { "content-type": "application/json" },
      body: JSON.stringify(Object.fromEntries(new FormData(form))),
    })
      .then((r) => {
        if (!r.ok) throw new Error(r.status);
        form.reset();
        status.textContent = "Message sent successfully.";
      })
      .catch(() => {
        status.textContent = "Failed to send message. Please try again.";
      })
      .finally(() => {
        button.disabled = false;
      });
  });
}
"##;

pub fn desktop_page(manager: &WindowManager, clock: &str) -> String {
    let markup = html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { "Portfolio" }
            }
            body {
                (menu_bar(manager, clock))
                main class="desktop" {
                    @for window in manager.windows() {
                        (window_frame(window))
                    }
                }
                script { (PreEscaped(DESKTOP_SCRIPT)) }
            }
        }
    };

    markup.into_string()
}

fn menu_bar(manager: &WindowManager, clock: &str) -> Markup {
    html! {
        nav class="menu-bar" {
            span class="brand" { "Portfolio" }
            @for definition in manager.catalog().iter() {
                button type="button" data-open-window=(definition.id) { (definition.menu_label) }
            }
            time class="clock" { (clock) }
        }
    }
}

fn window_frame(window: &WindowInstance) -> Markup {
    let definition = &window.definition;
    let style = format!(
        "left:{}px;top:{}px;width:{}px;height:{}px;z-index:{}",
        window.position.x, window.position.y, window.size.width, window.size.height, window.z_index
    );

    html! {
        div class="window" id={ "window-" (definition.id) } data-window=(definition.id) style=(style) {
            header class="title-bar" data-drag-handle {
                button type="button" class="close" data-close-window=(definition.id) aria-label="Close" { "×" }
                div {
                    p class="title" { (definition.title) }
                    p class="subtitle" { (definition.subtitle) }
                }
                @if let Some(badge) = definition.badge {
                    span class="badge" { (badge) }
                }
            }
            div class="content" { ((definition.render)()) }
            div class="resize-grip" data-resize-handle aria-label="Resize window" { "⇲" }
        }
    }
}
