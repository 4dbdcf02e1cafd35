pub mod review_form;
pub mod reviews_list;
pub mod skeleton_loader;
pub mod star_rating;
pub mod undo_toast;
