//! Seed data: two blogs, every post type, a few likes.

use serde_json::{json, Value};

use crate::{BlogFixture, Store};

fn post(blog: &str, kind: &str, id: u64, timestamp: i64, tags: &[&str], extra: Value) -> Value {
    let mut value = json!({
        "blog_name": blog,
        "id": id,
        "post_url": format!("https://{blog}.tumblr.com/post/{id}"),
        "type": kind,
        "timestamp": timestamp,
        "date": "2014-05-13 16:00:00 GMT",
        "format": "html",
        "reblog_key": format!("rk{id}"),
        "tags": tags,
        "note_count": id * 3,
    });
    if let (Some(obj), Some(extra)) = (value.as_object_mut(), extra.as_object()) {
        obj.extend(extra.clone());
    }
    value
}

fn staff_posts() -> Vec<Value> {
    vec![
        post("staff", "text", 108, 1_400_000_800, &["news"], json!({
            "title": "Hello", "body": "<p>Welcome to Tumblr.</p>"
        })),
        post("staff", "photo", 107, 1_400_000_700, &["gif", "art"], json!({
            "caption": "<p>A photo</p>", "width": 500, "height": 400,
            "photos": [{
                "caption": "",
                "alt_sizes": [{"width": 250, "height": 200, "url": "https://media.tumblr.com/a_250.jpg"}],
                "original_size": {"width": 500, "height": 400, "url": "https://media.tumblr.com/a.jpg"}
            }]
        })),
        post("staff", "quote", 106, 1_400_000_600, &["quotes"], json!({
            "text": "Be yourself; everyone else is already taken.", "source": "Oscar Wilde"
        })),
        post("staff", "link", 105, 1_400_000_500, &["links"], json!({
            "title": "Tumblr", "url": "https://www.tumblr.com", "description": "Home"
        })),
        post("staff", "chat", 104, 1_400_000_400, &["gif"], json!({
            "title": "Chat", "body": "a: hi\nb: hello",
            "dialogue": [
                {"name": "a", "label": "a:", "phrase": "hi"},
                {"name": "b", "label": "b:", "phrase": "hello"}
            ]
        })),
        post("staff", "audio", 103, 1_400_000_300, &["music"], json!({
            "caption": "Listen", "player": "<embed/>", "plays": 42,
            "artist": "Band", "track_name": "Song", "year": 2014
        })),
        post("staff", "video", 102, 1_400_000_200, &["gif", "video"], json!({
            "caption": "Watch",
            "player": [{"width": 250, "embed_code": "<iframe width=\"250\"></iframe>"}]
        })),
        post("staff", "answer", 101, 1_400_000_100, &["asks"], json!({
            "asking_name": "anonymous", "asking_url": null,
            "question": "Is this thing on?", "answer": "<p>Yes.</p>"
        })),
    ]
}

fn david_posts() -> Vec<Value> {
    (1..=25)
        .rev()
        .map(|i| {
            post("david", "text", i, 1_300_000_000 + i as i64, &["log"], json!({
                "title": format!("Entry {i}"), "body": format!("<p>{i}</p>")
            }))
        })
        .collect()
}

pub fn seeded() -> Store {
    let staff_posts = staff_posts();
    let david_posts = david_posts();
    let liked = vec![staff_posts[1].clone(), staff_posts[2].clone(), staff_posts[7].clone()];

    let mut store = Store::default();
    store.blogs.insert(
        "staff".to_string(),
        BlogFixture {
            info: json!({
                "title": "Tumblr Staff",
                "name": "staff",
                "url": "https://staff.tumblr.com/",
                "description": "<p>The official Tumblr staff blog.</p>",
                "posts": staff_posts.len(),
                "updated": 1_400_000_800,
                "ask": true,
                "ask_anon": false,
                "share_likes": true,
                "likes": liked.len(),
                "is_nsfw": false
            }),
            posts: staff_posts,
            likes: liked,
        },
    );
    store.blogs.insert(
        "david".to_string(),
        BlogFixture {
            info: json!({
                "title": "David's Log",
                "name": "david",
                "url": "https://david.tumblr.com/",
                "description": "",
                "posts": david_posts.len(),
                "updated": 1_300_000_025,
                "ask": false,
                "ask_anon": false,
                "share_likes": false
            }),
            posts: david_posts,
            likes: Vec::new(),
        },
    );
    store
}
