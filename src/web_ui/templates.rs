//! Template engine setup and HTML templates.

use once_cell::sync::Lazy;
use tera::{Context, Tera};

/// Global template engine instance with embedded templates.
pub static TEMPLATES: Lazy<Tera> = Lazy::new(|| {
    let mut tera = Tera::default();

    // Embed templates directly in the binary (no external files needed)
    if let Err(e) = tera.add_raw_templates(vec![
        ("base.html", BASE_TEMPLATE),
        ("discussions/index.html", INDEX_TEMPLATE),
        ("discussions/new.html", NEW_TEMPLATE),
        ("discussions/show.html", SHOW_TEMPLATE),
        ("discussions/edit.html", EDIT_TEMPLATE),
        ("login.html", LOGIN_TEMPLATE),
        ("signup.html", SIGNUP_TEMPLATE),
        ("error.html", ERROR_TEMPLATE),
    ]) {
        tracing::error!("Failed to load templates: {:?}", e);
    }

    tera
});

/// Render a template with context
pub fn render(template: &str, context: &Context) -> Result<String, tera::Error> {
    TEMPLATES.render(template, context)
}

// =============================================================================
// Embedded Templates
// =============================================================================

const BASE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{% block title %}{{ title }} - Discussions{% endblock %}</title>
    <style>
        :root {
            --bg: #0a0a0a;
            --bg-secondary: #141414;
            --foreground: #fafafa;
            --foreground-secondary: rgba(250, 250, 250, 0.7);
            --foreground-tertiary: rgba(250, 250, 250, 0.4);
            --border: #262626;
            --border-subtle: #1a1a1a;
            --danger: #f87171;
        }

        * { box-sizing: border-box; margin: 0; padding: 0; }

        body {
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Helvetica, Arial, sans-serif;
            background: var(--bg);
            color: var(--foreground);
            line-height: 1.6;
            -webkit-font-smoothing: antialiased;
        }

        a { color: var(--foreground); text-decoration: none; transition: opacity 0.15s; }
        a:hover { opacity: 0.7; }

        .header { border-bottom: 1px solid var(--border-subtle); padding: 20px 32px; }
        .header-content {
            max-width: 960px;
            margin: 0 auto;
            display: flex;
            align-items: center;
            justify-content: space-between;
        }
        .logo { font-size: 18px; font-weight: 600; letter-spacing: -0.02em; }
        .nav { display: flex; gap: 24px; align-items: center; }
        .nav a { color: var(--foreground-secondary); font-size: 14px; }

        .container { max-width: 960px; margin: 0 auto; padding: 48px 32px; }

        h1 { font-size: 32px; font-weight: 600; letter-spacing: -0.02em; margin-bottom: 24px; }
        h2 {
            font-size: 14px;
            font-weight: 500;
            color: var(--foreground-secondary);
            text-transform: uppercase;
            letter-spacing: 0.05em;
            margin: 32px 0 16px;
        }

        .card {
            background: var(--bg-secondary);
            border: 1px solid var(--border);
            border-radius: 16px;
            overflow: hidden;
        }
        .card-body { padding: 24px; }

        .list { list-style: none; }
        .list-item { padding: 16px 20px; border-bottom: 1px solid var(--border-subtle); }
        .list-item:last-child { border-bottom: none; }

        .badge {
            font-size: 11px;
            font-weight: 500;
            padding: 4px 10px;
            border-radius: 100px;
            background: var(--border);
            color: var(--foreground-secondary);
            text-transform: uppercase;
            letter-spacing: 0.02em;
        }

        .btn {
            display: inline-flex;
            align-items: center;
            padding: 10px 20px;
            border-radius: 100px;
            font-size: 14px;
            font-weight: 500;
            border: none;
            cursor: pointer;
        }
        .btn-primary { background: var(--foreground); color: var(--bg); }
        .btn-secondary { background: transparent; border: 1px solid var(--border); color: var(--foreground); }
        .btn-danger { background: transparent; border: 1px solid var(--danger); color: var(--danger); }

        .field { margin-bottom: 20px; }
        .field label { display: block; font-size: 13px; color: var(--foreground-secondary); margin-bottom: 6px; }
        .field input, .field textarea {
            width: 100%;
            padding: 12px 16px;
            background: var(--bg);
            border: 1px solid var(--border);
            border-radius: 8px;
            color: var(--foreground);
            font-size: 14px;
            font-family: inherit;
        }
        .field textarea { min-height: 200px; resize: vertical; }

        .alert {
            padding: 12px 16px;
            border-radius: 8px;
            border: 1px solid var(--danger);
            color: var(--danger);
            margin-bottom: 24px;
        }
        .prose { white-space: pre-wrap; color: var(--foreground-secondary); }
        .empty { text-align: center; padding: 64px 32px; color: var(--foreground-tertiary); }
        .meta { font-size: 13px; color: var(--foreground-tertiary); }
        .actions { display: flex; gap: 12px; margin-top: 24px; }
        .tags { display: flex; gap: 8px; flex-wrap: wrap; margin-top: 8px; }
    </style>
</head>
<body>
    <header class="header">
        <div class="header-content">
            <a href="/discussions" class="logo">Discussions</a>
            <nav class="nav">
                <a href="/discussions/new">New discussion</a>
                {% if current_user %}
                <span class="meta">{{ current_user }}</span>
                <a href="/logout">Sign out</a>
                {% else %}
                <a href="/login">Sign in</a>
                {% endif %}
            </nav>
        </div>
    </header>
    <main class="container" data-page="{{ page }}">
        {% block content %}{% endblock %}
    </main>
</body>
</html>"##;

const INDEX_TEMPLATE: &str = r##"{% extends "base.html" %}
{% block content %}
<h1>{{ title }}</h1>

{% if error %}
<div class="alert">{{ error }}</div>
{% endif %}

<div class="card">
    {% if discussions | length > 0 %}
    <ul class="list">
        {% for discussion in discussions %}
        <li class="list-item">
            <a href="/discussions/{{ discussion.id }}"><strong>{{ discussion.title }}</strong></a>
            <div class="meta">
                <span class="badge">{{ discussion.category }}</span>
                by {{ discussion.author }} &middot; {{ discussion.views }} views &middot; {{ discussion.created_at }}
            </div>
        </li>
        {% endfor %}
    </ul>
    {% else %}
    <div class="empty">
        <p>No discussions yet</p>
        <p class="meta"><a href="/discussions/new">Start the first one</a></p>
    </div>
    {% endif %}
</div>
{% endblock %}"##;

const NEW_TEMPLATE: &str = r##"{% extends "base.html" %}
{% block content %}
<h1>{{ title }}</h1>

<form method="POST" action="/discussions/create" class="card">
    <div class="card-body">
        <div class="field">
            <label for="title">Title</label>
            <input type="text" id="title" name="title" required />
        </div>
        <div class="field">
            <label for="description">Description</label>
            <textarea id="description" name="description" required></textarea>
        </div>
        <div class="field">
            <label for="category">Category</label>
            <input type="text" id="category" name="category" placeholder="general" />
        </div>
        <div class="field">
            <label for="tags">Tags (comma separated)</label>
            <input type="text" id="tags" name="tags" />
        </div>
        <div class="actions">
            <button type="submit" class="btn btn-primary">Create discussion</button>
            <a href="/discussions" class="btn btn-secondary">Cancel</a>
        </div>
    </div>
</form>
{% endblock %}"##;

const SHOW_TEMPLATE: &str = r##"{% extends "base.html" %}
{% block title %}{{ discussion.title }} - Discussions{% endblock %}
{% block content %}
<h1>{{ discussion.title }}</h1>
<div class="meta">
    <span class="badge">{{ discussion.category }}</span>
    by {{ discussion.author }} &middot; {{ discussion.views }} views &middot; {{ discussion.created_at }}
</div>
{% if discussion.tags | length > 0 %}
<div class="tags">
    {% for tag in discussion.tags %}<span class="badge">{{ tag }}</span>{% endfor %}
</div>
{% endif %}

<div class="card" style="margin-top: 24px;">
    <div class="card-body prose">{{ discussion.description }}</div>
</div>

<div class="actions">
    <a href="/discussions/{{ discussion.id }}/edit" class="btn btn-secondary">Edit</a>
    <form method="POST" action="/discussions/{{ discussion.id }}/delete">
        <button type="submit" class="btn btn-danger">Delete</button>
    </form>
</div>

<h2>Comments ({{ discussion.comments | length }})</h2>
<div class="card">
    {% if discussion.comments | length > 0 %}
    <ul class="list">
        {% for comment in discussion.comments %}
        <li class="list-item">
            <div class="prose">{{ comment.content }}</div>
            <div class="meta">{{ comment.created_at }}</div>
        </li>
        {% endfor %}
    </ul>
    {% else %}
    <div class="empty"><p>No comments yet</p></div>
    {% endif %}
</div>
{% endblock %}"##;

const EDIT_TEMPLATE: &str = r##"{% extends "base.html" %}
{% block content %}
<h1>{{ title }}</h1>

<form method="POST" action="/discussions/{{ discussion.id }}/update" class="card">
    <div class="card-body">
        <div class="field">
            <label for="title">Title</label>
            <input type="text" id="title" name="title" value="{{ discussion.title }}" required />
        </div>
        <div class="field">
            <label for="description">Description</label>
            <textarea id="description" name="description" required>{{ discussion.description }}</textarea>
        </div>
        <div class="field">
            <label for="category">Category</label>
            <input type="text" id="category" name="category" value="{{ discussion.category }}" />
        </div>
        <div class="field">
            <label for="tags">Tags (comma separated)</label>
            <input type="text" id="tags" name="tags" value="{{ discussion.tags_input }}" />
        </div>
        <p class="meta">Started by {{ discussion.author }} &middot; {{ discussion.comments | length }} comments</p>
        <div class="actions">
            <button type="submit" class="btn btn-primary">Save changes</button>
            <a href="/discussions/{{ discussion.id }}" class="btn btn-secondary">Cancel</a>
        </div>
    </div>
</form>
{% endblock %}"##;

const LOGIN_TEMPLATE: &str = r##"{% extends "base.html" %}
{% block content %}
<h1>{{ title }}</h1>

{% if error %}<div class="alert">{{ error }}</div>{% endif %}
{% if message %}<p class="meta" style="margin-bottom: 24px;">{{ message }}</p>{% endif %}

<form method="POST" action="/login" class="card">
    <div class="card-body">
        <div class="field">
            <label for="username">Username</label>
            <input type="text" id="username" name="username" required />
        </div>
        <div class="field">
            <label for="password">Password</label>
            <input type="password" id="password" name="password" required />
        </div>
        <div class="actions">
            <button type="submit" class="btn btn-primary">Sign in</button>
            <a href="/signup" class="btn btn-secondary">Create account</a>
        </div>
    </div>
</form>
{% endblock %}"##;

const SIGNUP_TEMPLATE: &str = r##"{% extends "base.html" %}
{% block content %}
<h1>{{ title }}</h1>

{% if error %}<div class="alert">{{ error }}</div>{% endif %}

<form method="POST" action="/signup" class="card">
    <div class="card-body">
        <div class="field">
            <label for="username">Username</label>
            <input type="text" id="username" name="username" required />
        </div>
        <div class="field">
            <label for="display_name">Display name (optional)</label>
            <input type="text" id="display_name" name="display_name" />
        </div>
        <div class="field">
            <label for="email">Email (optional)</label>
            <input type="email" id="email" name="email" />
        </div>
        <div class="field">
            <label for="password">Password</label>
            <input type="password" id="password" name="password" required />
        </div>
        <div class="actions">
            <button type="submit" class="btn btn-primary">Create account</button>
            <a href="/login" class="btn btn-secondary">Sign in instead</a>
        </div>
    </div>
</form>
{% endblock %}"##;

const ERROR_TEMPLATE: &str = r##"{% extends "base.html" %}
{% block content %}
<div class="card">
    <div style="padding: 48px; text-align: center;">
        <p class="meta">{{ status }}</p>
        <h1 style="margin-bottom: 16px;">{{ title }}</h1>
        <p class="prose">{{ message }}</p>
        <div class="actions" style="justify-content: center;">
            <a href="/discussions" class="btn btn-secondary">Back to discussions</a>
        </div>
    </div>
</div>
{% endblock %}"##;
