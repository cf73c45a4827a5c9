use ::price::{ChangeSign, PriceSnapshot};

use crate::platform::Reply;

pub fn render(snapshot: &PriceSnapshot) -> Reply {
    let label = match snapshot.sign() {
        ChangeSign::Flat => "Current price: \n",
        ChangeSign::Up | ChangeSign::Down => "Current price: ",
    };

    Reply::Text(format!(
        "{label}**${}** (*{}{}%*)",
        snapshot.price(),
        snapshot.sign(),
        snapshot.change_magnitude()
    ))
}
