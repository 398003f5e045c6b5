use nu_ansi_term::Color::{Blue, Cyan};
use shop_db::UserRepository;
use tracing::info;

use crate::{
    cli::UserAction,
    context::ShopContext,
    utils::{print_json, Colored},
};

pub fn handle(ctx: &mut ShopContext, action: UserAction) -> miette::Result<()> {
    match action {
        UserAction::Get {
            id,
        } => {
            let deadline = ctx.deadline();
            let user = UserRepository::find_one(&mut ctx.db, &id, deadline)?;
            if ctx.json {
                return print_json(&user);
            }
            info!(
                "{} {} <{}> [{}]",
                Colored(Cyan, &user.id),
                Colored(Blue, &user.username),
                user.email,
                user.role
            );
            Ok(())
        }
    }
}
