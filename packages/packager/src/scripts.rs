//! Fixed, theme-independent client scripts referenced by the templates.

/// One client script artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptFile {
    pub name: &'static str,
    pub contents: &'static str,
}

const CART_JS: &str = r#"(function () {
  'use strict';

  function post(url, body) {
    return fetch(url, {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify(body),
    }).then(function (res) { return res.json(); });
  }

  function refreshCount(count) {
    document.querySelectorAll('.cart-link').forEach(function (el) {
      el.textContent = 'Cart (' + count + ')';
    });
  }

  document.addEventListener('click', function (event) {
    var add = event.target.closest('.add-to-cart');
    if (add) {
      event.preventDefault();
      post('/api/cart/items', { productId: add.dataset.productId }).then(function (cart) {
        refreshCount(cart.count);
      });
      return;
    }

    var remove = event.target.closest('.cart-remove');
    if (remove) {
      event.preventDefault();
      fetch('/api/cart/items/' + remove.dataset.itemId, { method: 'DELETE' }).then(function () {
        window.location.reload();
      });
    }
  });
})();
"#;

const AUTH_JS: &str = r#"(function () {
  'use strict';

  function submitJson(form, url) {
    var data = {};
    new FormData(form).forEach(function (value, key) { data[key] = value; });
    return fetch(url, {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify(data),
    });
  }

  document.addEventListener('submit', function (event) {
    var form = event.target;
    if (form.matches('.login-form') || form.matches('.register-form')) {
      event.preventDefault();
      submitJson(form, form.action).then(function (res) {
        if (res.ok) {
          window.location.href = '/';
        } else {
          form.classList.add('auth-error');
        }
      });
    }
  });
})();
"#;

const CHECKOUT_JS: &str = r#"(function () {
  'use strict';

  document.addEventListener('submit', function (event) {
    var form = event.target;
    if (!form.matches('.checkout-form')) return;
    event.preventDefault();

    var button = form.querySelector('button[type="submit"]');
    if (button) button.disabled = true;

    var data = {};
    new FormData(form).forEach(function (value, key) { data[key] = value; });
    fetch(form.action, {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify(data),
    }).then(function (res) {
      if (res.ok) {
        window.location.href = '/order-confirmed';
      } else if (button) {
        button.disabled = false;
      }
    });
  });

  // Countdown blocks tick once a second.
  document.querySelectorAll('[data-countdown]').forEach(function (el) {
    var target = Date.parse(el.dataset.countdown);
    if (isNaN(target)) return;
    var timer = el.querySelector('.countdown-timer');
    setInterval(function () {
      var left = Math.max(0, target - Date.now());
      var s = Math.floor(left / 1000);
      timer.textContent =
        Math.floor(s / 86400) + 'd ' +
        Math.floor((s % 86400) / 3600) + 'h ' +
        Math.floor((s % 3600) / 60) + 'm ' +
        (s % 60) + 's';
    }, 1000);
  });
})();
"#;

/// The complete script bundle, identical for every theme.
pub fn script_bundle() -> Vec<ScriptFile> {
    vec![
        ScriptFile {
            name: "auth.js",
            contents: AUTH_JS,
        },
        ScriptFile {
            name: "cart.js",
            contents: CART_JS,
        },
        ScriptFile {
            name: "checkout.js",
            contents: CHECKOUT_JS,
        },
    ]
}
