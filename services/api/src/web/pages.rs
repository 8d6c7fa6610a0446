//! services/api/src/web/pages.rs
//!
//! Server-rendered HTML for the five pages. Every user-supplied string goes
//! through `escape` before it is written into markup.

use diabetes_core::{Label, Prediction};

use crate::web::session::Flash;

const STYLE: &str = "\
body{font-family:sans-serif;margin:0;background:#f7f7f7;color:#222}\
nav{background:#1f77b4;padding:10px 20px}nav a{color:#fff;margin-right:16px;text-decoration:none}\
main{max-width:640px;margin:24px auto;background:#fff;padding:24px;border-radius:10px}\
.flash{padding:10px;border-radius:4px;margin-bottom:12px}\
.success{background:#d4edda}.danger{background:#f8d7da}.warning{background:#fff3cd}.info{background:#d1ecf1}\
label{display:block;margin-top:10px}input{width:100%;padding:6px;box-sizing:border-box}\
button{margin-top:16px;background:#1f77b4;color:#fff;padding:10px 20px;border:none;border-radius:4px;cursor:pointer}\
.welcome{text-align:right;color:#b68d40}";

/// Replaces the five HTML-significant characters.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Probability as a percentage with two decimals, e.g. `0.67` → `67.00%`.
pub fn percent(probability: f64) -> String {
    format!("{:.2}%", probability * 100.0)
}

fn layout(title: &str, user: Option<&str>, flashes: &[Flash], body: &str) -> String {
    let mut html = format!(
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">\
         <title>{title} | Diabetes Prediction</title><style>{STYLE}</style></head><body><nav>\
         <a href=\"/\">Home</a>",
        title = escape(title),
    );
    match user {
        Some(_) => html.push_str("<a href=\"/predict\">Predict</a><a href=\"/logout\">Logout</a>"),
        None => html.push_str("<a href=\"/login\">Login</a><a href=\"/register\">Register</a>"),
    }
    html.push_str("</nav><main>");
    for flash in flashes {
        html.push_str(&format!(
            "<div class=\"flash {}\">{}</div>",
            flash.level.css_class(),
            escape(&flash.message)
        ));
    }
    html.push_str(body);
    html.push_str("</main></body></html>");
    html
}

pub fn home_page(user: Option<&str>, flashes: &[Flash]) -> String {
    let body = match user {
        Some(handle) => format!(
            "<div class=\"welcome\"><h1>Welcome, <strong>{}</strong>!</h1></div>\
             <a href=\"/predict\"><button>Go to Prediction</button></a>",
            escape(handle)
        ),
        None => "<h1>Diabetes Prediction</h1>\
                 <p>Estimate your diabetes risk from eight routine clinical measurements.</p>\
                 <p><a href=\"/login\">Login</a> or <a href=\"/register\">create an account</a> to begin.</p>"
            .to_string(),
    };
    layout("Home", user, flashes, &body)
}

pub fn register_page(flashes: &[Flash]) -> String {
    let body = "<h1>Register</h1><form method=\"post\" action=\"/register\">\
        <label>Name<input name=\"name\" required></label>\
        <label>Email<input name=\"email\" type=\"email\" required></label>\
        <label>Contact (optional)<input name=\"contact\"></label>\
        <label>User ID<input name=\"user_id\" required></label>\
        <label>Password<input name=\"password\" type=\"password\" required></label>\
        <button type=\"submit\">Register</button></form>\
        <p>Already registered? <a href=\"/login\">Login</a></p>";
    layout("Register", None, flashes, body)
}

pub fn login_page(flashes: &[Flash]) -> String {
    let body = "<h1>Login</h1><form method=\"post\" action=\"/login\">\
        <label>User ID<input name=\"user_id\" required></label>\
        <label>Password<input name=\"password\" type=\"password\" required></label>\
        <button type=\"submit\">Login</button></form>\
        <p>No account yet? <a href=\"/register\">Register</a></p>";
    layout("Login", None, flashes, body)
}

/// Form field names in classifier order, with their labels.
const PREDICT_FIELDS: [(&str, &str); 8] = [
    ("pregnancies", "Pregnancies"),
    ("glucose", "Glucose"),
    ("blood_pressure", "Blood Pressure"),
    ("skin_thickness", "Skin Thickness"),
    ("insulin", "Insulin"),
    ("bmi", "BMI"),
    ("dpf", "Diabetes Pedigree Function"),
    ("age", "Age"),
];

pub fn predict_page(user: &str, flashes: &[Flash]) -> String {
    let mut body = String::from("<h1>Enter your measurements</h1><form method=\"post\" action=\"/predict\">");
    for (name, label) in PREDICT_FIELDS {
        body.push_str(&format!(
            "<label>{label}<input name=\"{name}\" type=\"number\" step=\"any\" required></label>"
        ));
    }
    body.push_str("<button type=\"submit\">Predict</button></form>");
    layout("Predict", Some(user), flashes, &body)
}

pub fn result_page(user: &str, prediction: &Prediction, flashes: &[Flash]) -> String {
    let class = match prediction.label {
        Label::Diabetic => "danger",
        Label::NotDiabetic => "success",
    };
    let body = format!(
        "<h1>Prediction Result</h1><div class=\"flash {class}\"><h2>{label}</h2></div>\
         <p>Probability of being diabetic: <strong>{diabetic}</strong></p>\
         <p>Probability of not being diabetic: <strong>{not_diabetic}</strong></p>\
         <a href=\"/predict\"><button>Make another prediction</button></a>",
        label = prediction.label,
        diabetic = percent(prediction.p_diabetic),
        not_diabetic = percent(prediction.p_not_diabetic),
    );
    layout("Result", Some(user), flashes, &body)
}

pub fn error_page(message: &str) -> String {
    let body = format!(
        "<h1>Something went wrong</h1><p>{}</p><p><a href=\"/\">Back to home</a></p>",
        escape(message)
    );
    layout("Error", None, &[], &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::session::FlashLevel;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape("<script>alert('x') & \"y\"</script>"),
            "&lt;script&gt;alert(&#x27;x&#x27;) &amp; &quot;y&quot;&lt;/script&gt;"
        );
    }

    #[test]
    fn home_greets_by_escaped_handle() {
        let html = home_page(Some("<b>al</b>"), &[]);
        assert!(html.contains("Welcome, <strong>&lt;b&gt;al&lt;/b&gt;</strong>!"));
        assert!(html.contains("href=\"/logout\""));

        let anonymous = home_page(None, &[]);
        assert!(anonymous.contains("href=\"/register\""));
        assert!(!anonymous.contains("Welcome"));
    }

    #[test]
    fn flashes_render_with_their_level() {
        let flashes = vec![Flash {
            level: FlashLevel::Danger,
            message: "User ID or Email already exists!".into(),
        }];
        let html = register_page(&flashes);
        assert!(html.contains("<div class=\"flash danger\">User ID or Email already exists!</div>"));
    }

    #[test]
    fn every_flash_is_rendered_in_order() {
        let flashes = vec![
            Flash {
                level: FlashLevel::Info,
                message: "You have been logged out.".into(),
            },
            Flash {
                level: FlashLevel::Warning,
                message: "<second>".into(),
            },
        ];
        let html = home_page(None, &flashes);
        let first = html.find("<div class=\"flash info\">You have been logged out.</div>").unwrap();
        let second = html.find("<div class=\"flash warning\">&lt;second&gt;</div>").unwrap();
        assert!(first < second);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.ends_with("</main></body></html>"));
    }

    #[test]
    fn predict_form_names_every_feature() {
        let html = predict_page("alice1", &[]);
        for name in ["pregnancies", "glucose", "blood_pressure", "skin_thickness", "insulin", "bmi", "dpf", "age"] {
            assert!(html.contains(&format!("name=\"{name}\"")), "missing {name}");
        }
    }

    #[test]
    fn result_shows_label_and_percentages() {
        let prediction = Prediction {
            label: Label::NotDiabetic,
            p_diabetic: 0.27,
            p_not_diabetic: 0.73,
        };
        let html = result_page("alice1", &prediction, &[]);
        assert!(html.contains("<h2>Not Diabetic</h2>"));
        assert!(html.contains("27.00%"));
        assert!(html.contains("73.00%"));
    }
}
